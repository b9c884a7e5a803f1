//! Batched translation of existing entries into other languages

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::{json, Value};

use super::parse::{build_entry, dedup_items, parse_vocabulary_payload};
use super::{IngestionError, Result};
use crate::external::schema::vocabulary_schema;
use crate::external::{BackendRequest, Generator};
use crate::vocabulary::{EntryKey, VocabEntry};

pub const TRANSLATE_PROMPT: &str = "vocabulary_translator.batch";
pub const TRANSLATE_PHRASES_PROMPT: &str = "vocabulary_translator.batch_phrases";

const PHRASE_TYPE: &str = "phrase";

/// Outcome of translating into several languages at once
#[derive(Debug, Default)]
pub struct TranslationReport {
    pub entries: Vec<VocabEntry>,
    pub failures: Vec<(String, IngestionError)>,
}

pub struct VocabularyTranslator {
    generator: Arc<dyn Generator>,
}

impl VocabularyTranslator {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Translate `sources` into `target_language`, `batch_size` entries per call.
    ///
    /// A batch that yields nothing new is logged and skipped; the next batch
    /// continues from where it left off. A failed call aborts the whole run.
    pub async fn translate(
        &self,
        sources: &[VocabEntry],
        target_language: &str,
        batch_size: usize,
    ) -> Result<Vec<VocabEntry>> {
        if batch_size == 0 {
            return Err(IngestionError::InvalidRequest("batch size must be positive".into()));
        }

        let mut seen: HashSet<EntryKey> = HashSet::new();
        let mut results = Vec::new();

        for (index, batch) in sources.chunks(batch_size).enumerate() {
            let fresh = self.translate_batch(batch, target_language, &mut seen).await?;
            if fresh.is_empty() {
                log::warn!(
                    "Translation batch {} into {} yielded no new entries",
                    index,
                    target_language
                );
                continue;
            }
            results.extend(fresh);
        }

        Ok(results)
    }

    async fn translate_batch(
        &self,
        batch: &[VocabEntry],
        target_language: &str,
        seen: &mut HashSet<EntryKey>,
    ) -> Result<Vec<VocabEntry>> {
        let prompt = match batch.first() {
            Some(first) if first.has_type(PHRASE_TYPE) => TRANSLATE_PHRASES_PROMPT,
            _ => TRANSLATE_PROMPT,
        };

        let items: Vec<Value> = batch
            .iter()
            .map(|entry| {
                json!({
                    "meaning_en": entry.meaning_en(),
                    "word": entry.word,
                    "categories": entry.categories,
                    "vocab_types": entry.vocab_types(),
                })
            })
            .collect();

        let request = BackendRequest::new(prompt, vocabulary_schema())
            .param("n", batch.len())
            .param("target_language", target_language)
            .param("items", items);

        let payload = self.generator.generate(request).await?;
        let items = dedup_items(parse_vocabulary_payload(&payload)?, target_language);

        let by_meaning: HashMap<&str, &VocabEntry> =
            batch.iter().map(|entry| (entry.meaning_en(), entry)).collect();

        let mut fresh = Vec::new();
        for item in &items {
            let source = by_meaning.get(item.meaning_en.as_str());
            let categories = source.map(|s| s.categories.clone()).unwrap_or_default();
            let vocab_types = source.map(|s| s.vocab_types().to_vec()).unwrap_or_default();

            let Some(entry) = build_entry(item, target_language, &categories, &vocab_types) else {
                continue;
            };
            if seen.insert(entry.key()) {
                fresh.push(entry);
            }
        }

        Ok(fresh)
    }

    /// Translate the same sources into every language concurrently.
    ///
    /// Results are joined before anything is merged; a language whose run
    /// failed is reported and contributes nothing.
    pub async fn translate_into_languages(
        &self,
        sources: &[VocabEntry],
        target_languages: &[String],
        batch_size: usize,
    ) -> TranslationReport {
        let runs = target_languages
            .iter()
            .map(|language| self.translate(sources, language, batch_size));
        let outcomes = join_all(runs).await;

        let mut report = TranslationReport::default();
        let mut seen = HashSet::new();
        for (language, outcome) in target_languages.iter().zip(outcomes) {
            match outcome {
                Ok(entries) => report
                    .entries
                    .extend(entries.into_iter().filter(|e| seen.insert(e.id()))),
                Err(e) => {
                    log::warn!("Translation into {} failed: {}", language, e);
                    report.failures.push((language.clone(), e));
                }
            }
        }

        report
    }
}
