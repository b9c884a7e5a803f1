//! Data models for attempt history

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger rating stored when the learner gave no answer
pub const SKIPPED_RATING: i32 = -1;

/// Which side of a vocabulary pair was posed to the learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Pose the source word, expect the translation
    #[default]
    Source,
    /// Pose the translation, expect the source word
    Translation,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Translation => "translation",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "source" => Ok(Self::Source),
            "translation" => Ok(Self::Translation),
            other => Err(format!("invalid direction '{}': expected source or translation", other)),
        }
    }
}

/// One evaluation event (one line of the ledger)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub timestamp: DateTime<Utc>,
    pub source_word: String,
    pub translation_word: String,
    pub user_input: String,
    /// Score on the evaluator's 0-100 scale, or `SKIPPED_RATING`
    pub rating: i32,
    #[serde(default)]
    pub hint: String,
    pub direction: Direction,
}

impl AttemptRecord {
    pub fn new(
        source_word: &str,
        translation_word: &str,
        direction: Direction,
        user_input: &str,
        rating: i32,
        hint: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            source_word: source_word.to_string(),
            translation_word: translation_word.to_string(),
            user_input: user_input.to_string(),
            rating,
            hint: hint.to_string(),
            direction,
        }
    }

    pub fn skipped(source_word: &str, translation_word: &str, direction: Direction) -> Self {
        Self::new(source_word, translation_word, direction, "", SKIPPED_RATING, "")
    }

    pub fn matches(&self, source_word: &str, translation_word: &str, direction: Direction) -> bool {
        self.source_word == source_word
            && self.translation_word == translation_word
            && self.direction == direction
    }
}

/// Derived summary of the attempts for one word pair and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAggregate {
    /// Plain sum of ratings, sentinel attempts included
    pub overall_rating: i64,
    pub num_ratings: usize,
    pub last_check: Option<DateTime<Utc>>,
}

impl PerformanceAggregate {
    pub fn add(&mut self, record: &AttemptRecord) {
        self.overall_rating += i64::from(record.rating);
        self.num_ratings += 1;
        self.last_check = match self.last_check {
            Some(last) if last >= record.timestamp => Some(last),
            _ => Some(record.timestamp),
        };
    }

    pub fn average(&self) -> Option<f64> {
        if self.num_ratings == 0 {
            None
        } else {
            Some(self.overall_rating as f64 / self.num_ratings as f64)
        }
    }

    /// `last_check` as table text; empty when there is no history
    pub fn last_check_text(&self) -> String {
        self.last_check
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default()
    }
}
