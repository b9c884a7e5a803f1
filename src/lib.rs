//! Vocabulary drill engine: content-addressed entry store, attempt ledger,
//! performance-weighted card selection, ingestion through a language backend
//! and the interactive drill session.

pub mod config;
pub mod external;
pub mod i18n;
pub mod ingestion;
pub mod performance;
pub mod selection;
pub mod session;
pub mod table;
pub mod vocabulary;

pub use config::{AppConfig, DataLayout};
pub use i18n::Localization;
pub use performance::PerformanceLedger;
pub use vocabulary::EntryStore;
