//! JSON schemas for structured backend replies

use serde_json::{json, Value};

/// `{"vocabulary": [{meaning_en, language, word, categories, vocab_types}]}`
pub fn vocabulary_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "vocabulary": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "meaning_en": { "type": "string" },
                        "language": { "type": "string" },
                        "word": { "type": "string" },
                        "categories": { "type": "array", "items": { "type": "string" } },
                        "vocab_types": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["meaning_en", "language", "word", "categories", "vocab_types"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["vocabulary"],
        "additionalProperties": false
    })
}

/// `{"score": 0..=100, "hints": "..."}`
pub fn rating_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "hints": { "type": "string" }
        },
        "required": ["score", "hints"],
        "additionalProperties": false
    })
}
