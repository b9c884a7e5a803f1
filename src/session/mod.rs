//! Drill sessions
//!
//! A [`Session`] draws its cards once through the selector, runs each card
//! through a [`LearningUnit`] in order, records every result in the ledger
//! and finally aligns the backing table with the ledger.

pub mod runner;
pub mod terminal;
pub mod unit;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

use crate::performance::LedgerError;
use crate::selection::SelectionError;
use crate::table::TableError;

pub use runner::{Session, SessionOptions, SessionReport};
pub use terminal::TerminalLearner;
pub use unit::{
    CardEnv, CardOutcome, CardResult, CardState, Evaluation, LearnerAction, LearningUnit, OutcomeStatus,
};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Everything the session tells the learner
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CardStarted { index: usize, total: usize },
    Prompt { target_language: String },
    Hint { sentence: Option<String> },
    Reveal { word: String },
    Skipped { expected: String },
    Evaluated { score: i32, hints: String, expected: String },
    CardAborted { error: String },
    EmptyPool,
    Finished { count: usize, average: Option<f64> },
}

/// The person at the keyboard. `next_action` blocks until input arrives.
pub trait Learner {
    fn next_action(&mut self) -> std::io::Result<LearnerAction>;

    fn notify(&mut self, event: SessionEvent);
}
