//! Row-oriented backing table mirroring the vocabulary list and its
//! performance statistics.

pub mod align;
pub mod csv_table;

use thiserror::Error;

pub use align::{align_all, align_pair};
pub use csv_table::CsvTable;

pub const SOURCE_COLUMN: &str = "source";
pub const TRANSLATION_COLUMN: &str = "translation";
pub const CATEGORY_COLUMN: &str = "category";
pub const LAST_CHECK_COLUMN: &str = "last check";
pub const OVERALL_RATING_COLUMN: &str = "overall rating";
pub const NUM_RATINGS_COLUMN: &str = "num ratings";

pub const DEFAULT_HEADERS: [&str; 6] = [
    SOURCE_COLUMN,
    TRANSLATION_COLUMN,
    CATEGORY_COLUMN,
    LAST_CHECK_COLUMN,
    OVERALL_RATING_COLUMN,
    NUM_RATINGS_COLUMN,
];

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

pub type Result<T> = std::result::Result<T, TableError>;

pub trait TableClient: Send {
    fn headers(&self) -> &[String];

    /// Rows as cell lists aligned with `headers()`
    fn rows(&self) -> &[Vec<String>];

    /// Set `updates` on every row whose `column` equals `value`; append a new
    /// row holding `value` and the updates when none matches. Update columns
    /// missing from the table are added. Returns the number of rows touched.
    fn update_row_by_column_pattern(
        &mut self,
        column: &str,
        value: &str,
        updates: &[(&str, String)],
    ) -> Result<usize>;

    /// Flush pending changes to the backing medium
    fn write_data(&mut self) -> Result<()>;

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers().iter().position(|h| h == column)
    }

    fn cell<'a>(&'a self, row: &'a [String], column: &str) -> Option<&'a str> {
        self.column_index(column)
            .and_then(|i| row.get(i))
            .map(String::as_str)
    }
}

/// In-memory table; `write_data` is a no-op
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new(DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect())
    }
}

impl MemoryTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build from existing rows; short rows are padded, long rows cut.
    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Append a row given as `(column, value)` pairs
    pub fn push_row(&mut self, cells: &[(&str, &str)]) {
        for (column, _) in cells {
            self.ensure_column(column);
        }
        let mut row = vec![String::new(); self.headers.len()];
        for (column, value) in cells {
            if let Some(i) = self.headers.iter().position(|h| h == column) {
                row[i] = value.to_string();
            }
        }
        self.rows.push(row);
    }

    fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(i) = self.headers.iter().position(|h| h == column) {
            return i;
        }
        self.headers.push(column.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }
}

impl TableClient for MemoryTable {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn update_row_by_column_pattern(
        &mut self,
        column: &str,
        value: &str,
        updates: &[(&str, String)],
    ) -> Result<usize> {
        let key = self
            .column_index(column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?;
        let targets: Vec<usize> = updates.iter().map(|(name, _)| self.ensure_column(name)).collect();

        let mut touched = 0;
        for row in self.rows.iter_mut().filter(|row| row[key] == value) {
            for (&i, (_, cell)) in targets.iter().zip(updates) {
                row[i] = cell.clone();
            }
            touched += 1;
        }

        if touched == 0 {
            let mut row = vec![String::new(); self.headers.len()];
            row[key] = value.to_string();
            for (&i, (_, cell)) in targets.iter().zip(updates) {
                row[i] = cell.clone();
            }
            self.rows.push(row);
            touched = 1;
        }

        Ok(touched)
    }

    fn write_data(&mut self) -> Result<()> {
        Ok(())
    }
}
