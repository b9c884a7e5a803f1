//! Vocabulary entries for lexdrill
//!
//! This module provides:
//! - Content-addressed vocabulary entries (id derived from language, types and meaning)
//! - The `example_sentence` / `example_for` relation graph
//! - Learning cards pairing two entries with the same meaning
//! - A file-backed entry store

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::{EntryStore, StoreError};
