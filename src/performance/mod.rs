//! Attempt history: the append-only ledger and the aggregates derived from it.

pub mod ledger;
pub mod models;

pub use ledger::{LedgerError, PairKey, PerformanceLedger};
pub use models::*;
