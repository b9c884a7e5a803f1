//! Batched vocabulary generation

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};

use super::parse::{build_entry, dedup_items, parse_vocabulary_payload};
use super::{IngestionError, Result};
use crate::external::schema::vocabulary_schema;
use crate::external::{BackendRequest, Generator};
use crate::vocabulary::{EntryKey, VocabEntry};

pub const GENERATE_PROMPT: &str = "vocabulary_builder.generate";

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub n: usize,
    pub language: String,
    pub categories: Vec<String>,
    pub vocab_types: Vec<String>,
    pub batch_size: usize,
}

impl GenerationRequest {
    pub fn new(n: usize, language: &str, batch_size: usize) -> Self {
        Self {
            n,
            language: language.to_string(),
            categories: Vec::new(),
            vocab_types: Vec::new(),
            batch_size,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_vocab_types(mut self, vocab_types: Vec<String>) -> Self {
        self.vocab_types = vocab_types;
        self
    }
}

pub struct VocabularyBuilder {
    generator: Arc<dyn Generator>,
}

impl VocabularyBuilder {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Ask the generator for up to `request.n` entries not already in `existing`.
    ///
    /// Batches ask for `min(batch_size, remaining)` items. Generation stops
    /// early once a batch contributes nothing new; the result never holds
    /// more than `n` entries and never repeats a key from `existing`.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        existing: &[VocabEntry],
    ) -> Result<Vec<VocabEntry>> {
        if request.batch_size == 0 {
            return Err(IngestionError::InvalidRequest("batch size must be positive".into()));
        }

        let mut seen: HashSet<EntryKey> = existing.iter().map(VocabEntry::key).collect();
        let mut results: Vec<VocabEntry> = Vec::new();

        while results.len() < request.n {
            let remaining = request.n - results.len();
            let batch = remaining.min(request.batch_size);

            let known: Vec<Value> = existing
                .iter()
                .chain(results.iter())
                .map(|entry| json!({ "meaning_en": entry.meaning_en(), "vocab_types": entry.vocab_types() }))
                .collect();

            let backend_request = BackendRequest::new(GENERATE_PROMPT, vocabulary_schema())
                .param("n", batch)
                .param("language", &request.language)
                .param("categories", &request.categories)
                .param("vocab_types", &request.vocab_types)
                .param("existing_meanings_en", known);

            let payload = self.generator.generate(backend_request).await?;
            let items = dedup_items(parse_vocabulary_payload(&payload)?, &request.language);

            let mut fresh = Vec::new();
            for item in &items {
                let Some(entry) = build_entry(
                    item,
                    item.language_or(&request.language),
                    &request.categories,
                    &request.vocab_types,
                ) else {
                    continue;
                };
                if seen.insert(entry.key()) {
                    fresh.push(entry);
                }
            }

            if fresh.is_empty() {
                log::info!(
                    "Generator returned no new {} vocabulary ({} of {} collected), stopping",
                    request.language,
                    results.len(),
                    request.n
                );
                break;
            }

            log::debug!("Batch of {} yielded {} new entries", batch, fresh.len());
            results.extend(fresh);
        }

        results.truncate(request.n);
        Ok(results)
    }
}
