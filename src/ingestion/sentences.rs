//! Example sentences for base entries, wired into the entry graph

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;

use super::parse::{dedup_items, parse_vocabulary_payload, RawItem};
use super::{IngestionError, Result};
use crate::external::schema::vocabulary_schema;
use crate::external::{BackendRequest, Generator};
use crate::vocabulary::{link_example_sentence, EntryId, VocabEntry, EXAMPLE_SENTENCE_CATEGORY};

pub const SENTENCE_PROMPT: &str = "sentence_builder.examples";

const SENTENCE_TYPE: &str = "phrase";

/// Sentences produced for a group of base entries
#[derive(Debug, Default)]
pub struct SentenceReport {
    /// Each distinct sentence once, with edges to every base that uses it
    pub sentences: Vec<VocabEntry>,
    pub failures: Vec<(EntryId, IngestionError)>,
}

pub struct SentenceBuilder {
    generator: Arc<dyn Generator>,
}

impl SentenceBuilder {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    pub async fn request_sentences(&self, base: &VocabEntry, n: usize) -> Result<Vec<RawItem>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let request = BackendRequest::new(SENTENCE_PROMPT, vocabulary_schema())
            .param("n", n)
            .param("language", base.language())
            .param("word", &base.word)
            .param("meaning_en", base.meaning_en())
            .param("vocab_types", base.vocab_types());

        let payload = self.generator.generate(request).await?;
        Ok(dedup_items(parse_vocabulary_payload(&payload)?, base.language()))
    }

    /// Request `n` sentences for one base entry and link them to it.
    pub async fn link_sentences(&self, base: &mut VocabEntry, n: usize) -> Result<Vec<VocabEntry>> {
        let items = self.request_sentences(base, n).await?;
        Ok(attach_sentences(base, &items))
    }

    /// Request sentences for every base concurrently, then link once all
    /// replies are in. A base whose request failed keeps its edges unchanged.
    pub async fn link_sentences_many(&self, bases: &mut [VocabEntry], n: usize) -> SentenceReport {
        let requests = bases.iter().map(|base| self.request_sentences(base, n));
        let outcomes = join_all(requests).await;

        let mut report = SentenceReport::default();
        let mut positions: HashMap<EntryId, usize> = HashMap::new();

        for (base, outcome) in bases.iter_mut().zip(outcomes) {
            let items = match outcome {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("Example sentences for {} failed: {}", base.id(), e);
                    report.failures.push((base.id(), e));
                    continue;
                }
            };

            for sentence in attach_sentences(base, &items) {
                match positions.get(&sentence.id()) {
                    Some(&at) => report.sentences[at].merge_from(&sentence),
                    None => {
                        positions.insert(sentence.id(), report.sentences.len());
                        report.sentences.push(sentence);
                    }
                }
            }
        }

        report
    }
}

/// Build sentence entries from generator items and wire the symmetric edges
/// to `base`. Items missing a language take the base's; missing types become
/// `["phrase"]`. Every sentence carries the example-sentence category.
pub fn attach_sentences(base: &mut VocabEntry, items: &[RawItem]) -> Vec<VocabEntry> {
    let mut sentences: Vec<VocabEntry> = Vec::new();

    for item in items {
        let vocab_types = if item.vocab_types.is_empty() {
            vec![SENTENCE_TYPE.to_string()]
        } else {
            item.vocab_types.clone()
        };
        let mut categories = if item.categories.is_empty() {
            base.categories.clone()
        } else {
            item.categories.clone()
        };
        if !categories.iter().any(|c| c == EXAMPLE_SENTENCE_CATEGORY) {
            categories.push(EXAMPLE_SENTENCE_CATEGORY.to_string());
        }

        let mut sentence = match VocabEntry::new(&item.meaning_en, item.language_or(base.language()), vocab_types) {
            Ok(entry) => entry.with_word(item.word.clone()).with_categories(categories),
            Err(e) => {
                log::debug!("Dropping example sentence for {}: {}", base.id(), e);
                continue;
            }
        };

        if sentence.id() == base.id() {
            log::debug!("Ignoring example sentence identical to its base {}", base.id());
            continue;
        }
        if sentences.iter().any(|s| s.id() == sentence.id()) {
            continue;
        }

        link_example_sentence(base, &mut sentence);
        sentences.push(sentence);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::testing::{vocab_reply, ScriptedGenerator};
    use crate::vocabulary::Relation;

    fn base(meaning: &str, word: &str) -> VocabEntry {
        VocabEntry::new(meaning, "fr", vec!["noun".into()])
            .unwrap()
            .with_word(word)
            .with_categories(vec!["animals".into()])
    }

    fn raw(meaning: &str, word: &str) -> RawItem {
        RawItem {
            meaning_en: meaning.into(),
            language: None,
            word: word.into(),
            categories: Vec::new(),
            vocab_types: Vec::new(),
        }
    }

    #[test]
    fn test_attach_sentences_wires_both_directions() {
        let mut dog = base("dog", "(le) chien");
        let sentences = attach_sentences(
            &mut dog,
            &[raw("The dog sleeps.", "Le chien dort."), raw("The dog sleeps.", "Le chien dort.")],
        );

        assert_eq!(sentences.len(), 1);
        let sentence = &sentences[0];
        assert_eq!(sentence.language(), "fr");
        assert_eq!(sentence.vocab_types(), ["phrase".to_string()]);
        assert_eq!(sentence.categories, vec!["animals", EXAMPLE_SENTENCE_CATEGORY]);

        assert_eq!(dog.links(Relation::ExampleSentence).collect::<Vec<_>>(), vec![sentence.id()]);
        assert_eq!(sentence.links(Relation::ExampleFor).collect::<Vec<_>>(), vec![dog.id()]);

        // Attaching the same sentence again adds no edge
        let again = attach_sentences(&mut dog, &[raw("The dog sleeps.", "Le chien dort.")]);
        assert_eq!(again.len(), 1);
        assert_eq!(dog.linked_items().len(), 1);
    }

    #[tokio::test]
    async fn test_link_sentences_requests_with_base_fields() {
        let generator = Arc::new(ScriptedGenerator::new(vec![vocab_reply(&[
            ("The dog barks.", "fr", "Le chien aboie.", &["phrase"]),
            ("I have a dog.", "fr", "J'ai un chien.", &["phrase"]),
        ])]));
        let builder = SentenceBuilder::new(generator.clone());
        let mut dog = base("dog", "(le) chien");

        let sentences = builder.link_sentences(&mut dog, 2).await.unwrap();

        assert_eq!(sentences.len(), 2);
        assert_eq!(dog.links(Relation::ExampleSentence).count(), 2);
        let params = &generator.requests()[0].params;
        assert_eq!(params["word"], "(le) chien");
        assert_eq!(params["n"], 2);
    }

    #[tokio::test]
    async fn test_link_many_merges_shared_sentences() {
        let shared = ("The dog chases the cat.", "fr", "Le chien chasse le chat.", &["phrase"][..]);
        let generator = Arc::new(ScriptedGenerator::with_results(vec![
            Ok(vocab_reply(&[shared])),
            Ok(vocab_reply(&[shared])),
            Err("timeout".into()),
        ]));
        let builder = SentenceBuilder::new(generator.clone());
        let mut bases = vec![base("dog", "(le) chien"), base("cat", "(le) chat"), base("bird", "(l') oiseau")];

        let report = builder.link_sentences_many(&mut bases, 1).await;

        assert_eq!(generator.calls(), 3);
        assert_eq!(report.sentences.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, bases[2].id());

        let for_bases: Vec<EntryId> = report.sentences[0].links(Relation::ExampleFor).collect();
        assert_eq!(for_bases, vec![bases[0].id(), bases[1].id()]);
        assert!(bases[2].linked_items().is_empty());
    }
}
