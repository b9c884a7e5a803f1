pub mod align;
pub mod categories;
pub mod drill;
pub mod generate;
pub mod list;
pub mod sentences;
pub mod stats;
pub mod translate;
