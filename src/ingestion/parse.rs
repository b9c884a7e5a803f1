//! Shape checks and cleanup for generator payloads.
//!
//! A payload must be an object holding a `vocabulary` list; anything else
//! fails the whole call. Inside the list, elements that are not objects or
//! lack a string `meaning_en` / `word` are dropped one by one.

use std::collections::HashSet;

use serde_json::Value;

use super::{IngestionError, Result};
use crate::vocabulary::{EntryKey, VocabEntry};

pub const VOCABULARY_FIELD: &str = "vocabulary";

/// One cleaned item from a generator payload
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub meaning_en: String,
    pub language: Option<String>,
    pub word: String,
    pub categories: Vec<String>,
    pub vocab_types: Vec<String>,
}

impl RawItem {
    pub fn language_or<'a>(&'a self, default_language: &'a str) -> &'a str {
        self.language.as_deref().unwrap_or(default_language)
    }

    pub fn key(&self, default_language: &str) -> EntryKey {
        EntryKey::new(self.language_or(default_language), &self.meaning_en, &self.vocab_types)
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_vocabulary_payload(payload: &Value) -> Result<Vec<RawItem>> {
    let object = payload.as_object().ok_or_else(|| {
        IngestionError::MalformedResponse(format!("expected an object, got {}", value_kind(payload)))
    })?;

    let items = object
        .get(VOCABULARY_FIELD)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            IngestionError::MalformedResponse(format!("response has no '{}' list", VOCABULARY_FIELD))
        })?;

    let mut cleaned = Vec::with_capacity(items.len());
    for item in items {
        let Some(fields) = item.as_object() else {
            log::debug!("Dropping non-object vocabulary item: {}", item);
            continue;
        };
        let (Some(meaning_en), Some(word)) = (
            fields.get("meaning_en").and_then(Value::as_str),
            fields.get("word").and_then(Value::as_str),
        ) else {
            log::debug!("Dropping vocabulary item without meaning_en/word: {}", item);
            continue;
        };

        let language = fields
            .get("language")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        cleaned.push(RawItem {
            meaning_en: meaning_en.trim().to_string(),
            language,
            word: word.trim().to_string(),
            categories: string_list(fields.get("categories")),
            vocab_types: string_list(fields.get("vocab_types")),
        });
    }

    Ok(cleaned)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Drop items repeating an earlier `(language, meaning_en, vocab_types)` key
pub fn dedup_items(items: Vec<RawItem>, default_language: &str) -> Vec<RawItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.key(default_language)))
        .collect()
}

/// Turn a cleaned item into an entry. Empty item fields fall back to the
/// given defaults; items that still lack identity fields are dropped.
pub fn build_entry(
    item: &RawItem,
    language: &str,
    default_categories: &[String],
    default_vocab_types: &[String],
) -> Option<VocabEntry> {
    let vocab_types = if item.vocab_types.is_empty() {
        default_vocab_types.to_vec()
    } else {
        item.vocab_types.clone()
    };
    let categories = if item.categories.is_empty() {
        default_categories.to_vec()
    } else {
        item.categories.clone()
    };

    match VocabEntry::new(&item.meaning_en, language, vocab_types) {
        Ok(entry) => Some(entry.with_word(item.word.clone()).with_categories(categories)),
        Err(e) => {
            log::debug!("Dropping generated item '{}': {}", item.meaning_en, e);
            None
        }
    }
}
