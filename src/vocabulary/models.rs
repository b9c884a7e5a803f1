//! Data models for vocabulary entries and learning cards

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Namespace for content-derived entry ids
const ENTRY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c65_7864_7269_6c6c_8e4f_1d2a_9b3c_5e70);

/// Category added to every generated example sentence
pub const EXAMPLE_SENTENCE_CATEGORY: &str = "example_sentence";

#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Card mismatch: {source_id} and {target_id} differ in {field}")]
    CardMismatch {
        source_id: EntryId,
        target_id: EntryId,
        field: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, VocabError>;

/// Identity of a vocabulary entry.
///
/// New entries derive it from `(language, vocab_types, meaning_en)`, so two
/// entries built from the same triple always share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn derive(language: &str, vocab_types: &[String], meaning_en: &str) -> Self {
        // Unit/record separators keep ("a_b") and ("a", "b") distinct.
        let name = format!(
            "{}\u{1f}{}\u{1f}{}",
            language,
            vocab_types.join("\u{1e}"),
            meaning_en
        );
        Self(Uuid::new_v5(&ENTRY_ID_NAMESPACE, name.as_bytes()))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Deduplication key shared by ingestion, store and translation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub language: String,
    pub meaning_en: String,
    pub vocab_types: Vec<String>,
}

impl EntryKey {
    pub fn new(language: &str, meaning_en: &str, vocab_types: &[String]) -> Self {
        Self {
            language: language.to_string(),
            meaning_en: meaning_en.to_string(),
            vocab_types: vocab_types.to_vec(),
        }
    }
}

/// Relation carried by a graph edge between entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// The owner is the base word, the target is an example sentence
    ExampleSentence,
    /// The owner is an example sentence for the target
    ExampleFor,
}

impl Relation {
    pub fn inverse(self) -> Self {
        match self {
            Self::ExampleSentence => Self::ExampleFor,
            Self::ExampleFor => Self::ExampleSentence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedItem {
    pub target_id: EntryId,
    pub relation: Relation,
}

/// A single word or phrase in one language, tied to an English meaning anchor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabEntry {
    id: EntryId,
    meaning_en: String,
    language: String,
    vocab_types: Vec<String>,
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    linked_items: Vec<LinkedItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VocabEntry {
    /// Create a brand-new entry; the id is derived from its identity triple.
    pub fn new(meaning_en: &str, language: &str, vocab_types: Vec<String>) -> Result<Self> {
        let meaning_en = meaning_en.trim();
        let language = language.trim();
        if meaning_en.is_empty() {
            return Err(VocabError::InvalidEntry("meaning_en must not be empty".into()));
        }
        if language.is_empty() {
            return Err(VocabError::InvalidEntry("language must not be empty".into()));
        }
        if vocab_types.is_empty() {
            return Err(VocabError::InvalidEntry(format!(
                "vocab_types must not be empty for '{}'",
                meaning_en
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: EntryId::derive(language, &vocab_types, meaning_en),
            meaning_en: meaning_en.to_string(),
            language: language.to_string(),
            vocab_types,
            word: String::new(),
            categories: Vec::new(),
            linked_items: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = word.into();
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn meaning_en(&self) -> &str {
        &self.meaning_en
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn vocab_types(&self) -> &[String] {
        &self.vocab_types
    }

    pub fn linked_items(&self) -> &[LinkedItem] {
        &self.linked_items
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(&self.language, &self.meaning_en, &self.vocab_types)
    }

    pub fn has_type(&self, vocab_type: &str) -> bool {
        self.vocab_types.iter().any(|t| t == vocab_type)
    }

    pub fn has_any_category(&self, categories: &[String]) -> bool {
        categories.iter().any(|c| self.categories.contains(c))
    }

    /// Add an edge; returns false when `(target_id, relation)` is already present.
    pub fn link(&mut self, target_id: EntryId, relation: Relation) -> bool {
        let item = LinkedItem { target_id, relation };
        if self.linked_items.contains(&item) {
            return false;
        }
        self.linked_items.push(item);
        self.updated_at = Utc::now();
        true
    }

    /// Targets of all edges with the given relation, in insertion order
    pub fn links(&self, relation: Relation) -> impl Iterator<Item = EntryId> + '_ {
        self.linked_items
            .iter()
            .filter(move |li| li.relation == relation)
            .map(|li| li.target_id)
    }

    /// Fold another copy of the same entry into this one (edges and categories).
    pub fn merge_from(&mut self, other: &VocabEntry) {
        for item in &other.linked_items {
            self.link(item.target_id, item.relation);
        }
        for category in &other.categories {
            if !self.categories.contains(category) {
                self.categories.push(category.clone());
            }
        }
    }
}

/// Wire the symmetric `example_sentence` / `example_for` edges between a base
/// entry and one of its example sentences.
pub fn link_example_sentence(base: &mut VocabEntry, sentence: &mut VocabEntry) {
    base.link(sentence.id(), Relation::ExampleSentence);
    sentence.link(base.id(), Relation::ExampleFor);
}

impl PartialEq for VocabEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.meaning_en == other.meaning_en
            && self.language == other.language
            && self.word == other.word
            && self.categories == other.categories
            && self.vocab_types == other.vocab_types
            && self.linked_items == other.linked_items
    }
}

impl fmt::Display for VocabEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}: {})", self.meaning_en, self.language, self.word)?;
        if !self.categories.is_empty() {
            write!(f, " [categories: {}]", self.categories.join(", "))?;
        }
        if !self.vocab_types.is_empty() {
            write!(f, " [types: {}]", self.vocab_types.join(", "))?;
        }
        Ok(())
    }
}

/// A source/target pair presented together in a drill
#[derive(Debug, Clone)]
pub struct LearningCard {
    pub source: VocabEntry,
    pub target: VocabEntry,
}

impl LearningCard {
    pub fn new(source: VocabEntry, target: VocabEntry) -> Result<Self> {
        if source.meaning_en != target.meaning_en {
            return Err(VocabError::CardMismatch {
                source_id: source.id,
                target_id: target.id,
                field: "meaning_en",
            });
        }
        if source.vocab_types != target.vocab_types {
            return Err(VocabError::CardMismatch {
                source_id: source.id,
                target_id: target.id,
                field: "vocab_types",
            });
        }
        Ok(Self { source, target })
    }

    pub fn meaning_en(&self) -> &str {
        &self.source.meaning_en
    }
}
