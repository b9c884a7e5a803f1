//! Ingestion: new entries from an external generator.
//!
//! Three modes share one payload format and the `(language, meaning_en,
//! vocab_types)` dedup key:
//! - generation of fresh vocabulary ([`VocabularyBuilder`])
//! - translation of existing entries ([`VocabularyTranslator`])
//! - example sentences linked to a base entry ([`SentenceBuilder`])
//!
//! [`IngestionPipeline`] runs them against an [`EntryStore`].

pub mod builder;
pub mod parse;
pub mod sentences;
pub mod translator;

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::external::{BackendError, Generator};
use crate::vocabulary::{EntryId, EntryKey, EntryStore, StoreError, VocabEntry};

pub use builder::{GenerationRequest, VocabularyBuilder};
pub use parse::RawItem;
pub use sentences::{attach_sentences, SentenceBuilder, SentenceReport};
pub use translator::{TranslationReport, VocabularyTranslator};

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Malformed generator response: {0}")]
    MalformedResponse(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, IngestionError>;

pub struct IngestionPipeline {
    builder: VocabularyBuilder,
    translator: VocabularyTranslator,
    sentences: SentenceBuilder,
}

impl IngestionPipeline {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            builder: VocabularyBuilder::new(generator.clone()),
            translator: VocabularyTranslator::new(generator.clone()),
            sentences: SentenceBuilder::new(generator),
        }
    }

    pub fn builder(&self) -> &VocabularyBuilder {
        &self.builder
    }

    pub fn translator(&self) -> &VocabularyTranslator {
        &self.translator
    }

    pub fn sentences(&self) -> &SentenceBuilder {
        &self.sentences
    }

    /// Generate new vocabulary and add it to the store.
    ///
    /// Entries already in the store for the requested language are passed to
    /// the generator as exclusions. Items whose key is already stored, in any
    /// language, are dropped.
    pub async fn generate_into(
        &self,
        store: &mut EntryStore,
        request: &GenerationRequest,
        persist: bool,
    ) -> Result<Vec<VocabEntry>> {
        let existing: Vec<VocabEntry> = store
            .by_language(&request.language)
            .into_iter()
            .cloned()
            .collect();
        let stored_keys: HashSet<EntryKey> = store.iter().map(VocabEntry::key).collect();

        let mut entries = self.builder.generate(request, &existing).await?;
        entries.retain(|e| {
            let known = stored_keys.contains(&e.key());
            if known {
                log::debug!("Dropping generated entry already in store: {}", e);
            }
            !known
        });
        add_all(store, &entries, persist)?;
        log::info!("Added {} generated {} entries", entries.len(), request.language);
        Ok(entries)
    }

    /// Translate every `source_language` entry of the given types that has no
    /// counterpart yet in a target language, and add the results.
    pub async fn translate_into(
        &self,
        store: &mut EntryStore,
        source_language: &str,
        target_languages: &[String],
        vocab_types: &[String],
        batch_size: usize,
        persist: bool,
    ) -> Result<TranslationReport> {
        if target_languages.iter().any(|l| l == source_language) {
            return Err(IngestionError::InvalidRequest(format!(
                "cannot translate {} into itself",
                source_language
            )));
        }

        let existing: HashSet<EntryKey> = store.iter().map(VocabEntry::key).collect();
        let sources: Vec<VocabEntry> = store
            .by_language(source_language)
            .into_iter()
            .filter(|e| vocab_types.is_empty() || e.vocab_types() == vocab_types)
            .filter(|e| {
                target_languages
                    .iter()
                    .any(|target| !existing.contains(&EntryKey::new(target, e.meaning_en(), e.vocab_types())))
            })
            .cloned()
            .collect();

        let mut report = self
            .translator
            .translate_into_languages(&sources, target_languages, batch_size)
            .await;
        report.entries.retain(|e| !existing.contains(&e.key()));

        add_all(store, &report.entries, persist)?;
        log::info!(
            "Added {} translated entries from {} sources",
            report.entries.len(),
            sources.len()
        );
        Ok(report)
    }

    /// Generate example sentences for the given base entries and store both
    /// the sentences and the updated bases.
    pub async fn link_sentences_into(
        &self,
        store: &mut EntryStore,
        base_ids: &[EntryId],
        n: usize,
        persist: bool,
    ) -> Result<SentenceReport> {
        let mut bases = Vec::with_capacity(base_ids.len());
        for id in base_ids {
            let base = store.get(*id).cloned().ok_or(StoreError::EntryNotFound(*id))?;
            bases.push(base);
        }

        let mut report = self.sentences.link_sentences_many(&mut bases, n).await;

        for sentence in &mut report.sentences {
            if let Some(stored) = store.get(sentence.id()) {
                sentence.merge_from(stored);
            }
        }

        add_all(store, &report.sentences, persist)?;
        add_all(store, &bases, persist)?;
        Ok(report)
    }
}

/// Add entries, folding in the edges and categories of any stored copy with
/// the same id so no link is lost.
fn add_all(store: &mut EntryStore, entries: &[VocabEntry], persist: bool) -> Result<()> {
    for entry in entries {
        let mut entry = entry.clone();
        if let Some(stored) = store.get(entry.id()) {
            entry.merge_from(stored);
        }
        store.add(entry, persist)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::{vocab_reply, ScriptedGenerator};
    use crate::vocabulary::Relation;
    use tempfile::TempDir;

    fn create_test_store() -> (EntryStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = EntryStore::open(temp_dir.path().join("vocabulary")).unwrap();
        (store, temp_dir)
    }

    fn noun(meaning: &str, language: &str, word: &str) -> VocabEntry {
        VocabEntry::new(meaning, language, vec!["noun".into()])
            .unwrap()
            .with_word(word)
    }

    #[tokio::test]
    async fn test_generate_into_persists() {
        let (mut store, temp_dir) = create_test_store();
        store.add(noun("dog", "fr", "(le) chien"), true).unwrap();

        let generator = Arc::new(ScriptedGenerator::new(vec![vocab_reply(&[
            ("dog", "fr", "(le) chien", &["noun"]),
            ("cat", "fr", "(le) chat", &["noun"]),
        ])]));
        let pipeline = IngestionPipeline::new(generator);
        let request = GenerationRequest::new(5, "fr", 5).with_vocab_types(vec!["noun".into()]);

        let added = pipeline.generate_into(&mut store, &request, true).await.unwrap();

        assert_eq!(added.len(), 1);
        assert_eq!(added[0].meaning_en(), "cat");

        let reopened = EntryStore::open(temp_dir.path().join("vocabulary")).unwrap();
        assert_eq!(reopened.len(), 2);
    }

    #[tokio::test]
    async fn test_translate_into_skips_already_translated() {
        let (mut store, _temp_dir) = create_test_store();
        store.add(noun("dog", "fr", "(le) chien"), false).unwrap();
        store.add(noun("cat", "fr", "(le) chat"), false).unwrap();
        store.add(noun("dog", "de", "(der) Hund"), false).unwrap();

        let generator = Arc::new(ScriptedGenerator::new(vec![vocab_reply(&[(
            "cat",
            "de",
            "(die) Katze",
            &["noun"],
        )])]));
        let pipeline = IngestionPipeline::new(generator.clone());

        let report = pipeline
            .translate_into(&mut store, "fr", &["de".to_string()], &[], 10, false)
            .await
            .unwrap();

        assert_eq!(report.entries.len(), 1);
        assert_eq!(store.by_language("de").len(), 2);
        let items = &generator.requests()[0].params["items"];
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["meaning_en"], "cat");

        assert!(matches!(
            pipeline
                .translate_into(&mut store, "fr", &["fr".to_string()], &[], 10, false)
                .await,
            Err(IngestionError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_link_sentences_into_updates_store() {
        let (mut store, _temp_dir) = create_test_store();
        let dog = noun("dog", "fr", "(le) chien");
        store.add(dog.clone(), true).unwrap();

        let generator = Arc::new(ScriptedGenerator::new(vec![vocab_reply(&[(
            "The dog sleeps.",
            "fr",
            "Le chien dort.",
            &["phrase"],
        )])]));
        let pipeline = IngestionPipeline::new(generator);

        let report = pipeline
            .link_sentences_into(&mut store, &[dog.id()], 1, true)
            .await
            .unwrap();
        assert_eq!(report.sentences.len(), 1);

        let stored_dog = store.get(dog.id()).unwrap();
        let sentences = store.resolve_linked_sentences(stored_dog);
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].word, "Le chien dort.");
        assert_eq!(
            sentences[0].links(Relation::ExampleFor).collect::<Vec<_>>(),
            vec![dog.id()]
        );

        let missing = EntryId::derive("fr", &["noun".into()], "unicorn");
        assert!(matches!(
            pipeline.link_sentences_into(&mut store, &[missing], 1, false).await,
            Err(IngestionError::Store(StoreError::EntryNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_generate_into_keeps_stored_entry_in_other_language() {
        let (mut store, temp_dir) = create_test_store();
        let mut hund = noun("dog", "de", "(der) Hund");
        let mut sentence = VocabEntry::new("The dog sleeps.", "de", vec!["phrase".into()])
            .unwrap()
            .with_word("Der Hund schläft.");
        crate::vocabulary::link_example_sentence(&mut hund, &mut sentence);
        store.add(hund.clone(), true).unwrap();
        store.add(sentence.clone(), true).unwrap();

        let generator = Arc::new(ScriptedGenerator::new(vec![vocab_reply(&[(
            "dog",
            "de",
            "Hund",
            &["noun"],
        )])]));
        let pipeline = IngestionPipeline::new(generator);
        let request = GenerationRequest::new(1, "fr", 5).with_vocab_types(vec!["noun".into()]);

        let added = pipeline.generate_into(&mut store, &request, true).await.unwrap();
        assert!(added.is_empty());

        let reopened = EntryStore::open(temp_dir.path().join("vocabulary")).unwrap();
        let stored = reopened.get(hund.id()).unwrap();
        assert_eq!(stored.word, "(der) Hund");
        assert_eq!(
            stored.links(Relation::ExampleSentence).collect::<Vec<_>>(),
            vec![sentence.id()]
        );
    }

    #[tokio::test]
    async fn test_link_sentences_into_keeps_edges_of_sentence_that_is_also_a_base() {
        let (mut store, temp_dir) = create_test_store();
        let dog = noun("dog", "fr", "(le) chien");
        let sleeps = VocabEntry::new("The dog sleeps.", "fr", vec!["phrase".into()])
            .unwrap()
            .with_word("Le chien dort.");
        store.add(dog.clone(), true).unwrap();
        store.add(sleeps.clone(), true).unwrap();

        let reply = || {
            vocab_reply(&[
                ("The dog sleeps.", "fr", "Le chien dort.", &["phrase"]),
                ("The cat sleeps.", "fr", "Le chat dort.", &["phrase"]),
            ])
        };
        let generator = Arc::new(ScriptedGenerator::new(vec![reply(), reply()]));
        let pipeline = IngestionPipeline::new(generator);

        pipeline
            .link_sentences_into(&mut store, &[dog.id(), sleeps.id()], 2, true)
            .await
            .unwrap();

        let reopened = EntryStore::open(temp_dir.path().join("vocabulary")).unwrap();
        let stored_sleeps = reopened.get(sleeps.id()).unwrap();
        assert_eq!(
            stored_sleeps.links(Relation::ExampleFor).collect::<Vec<_>>(),
            vec![dog.id()]
        );
        assert_eq!(stored_sleeps.links(Relation::ExampleSentence).count(), 1);
        assert!(reopened
            .get(dog.id())
            .unwrap()
            .links(Relation::ExampleSentence)
            .any(|id| id == sleeps.id()));
    }
}
