use std::fs;
use std::path::{Path, PathBuf};

use super::{MemoryTable, Result, TableClient};

/// Table kept in a CSV file with a header row.
///
/// Edits stay in memory until `write_data`, which rewrites the whole file.
pub struct CsvTable {
    path: PathBuf,
    data: MemoryTable,
}

impl CsvTable {
    /// Open `path`; a missing file starts an empty table with the default columns.
    pub fn open(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            log::debug!("Backing table {:?} does not exist yet", path);
            return Ok(Self {
                path,
                data: MemoryTable::default(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            match record {
                Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
                Err(e) => log::warn!("Skipping unreadable row {} in {:?}: {}", index + 1, path, e),
            }
        }

        Ok(Self {
            path,
            data: MemoryTable::with_rows(headers, rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableClient for CsvTable {
    fn headers(&self) -> &[String] {
        self.data.headers()
    }

    fn rows(&self) -> &[Vec<String>] {
        self.data.rows()
    }

    fn update_row_by_column_pattern(
        &mut self,
        column: &str,
        value: &str,
        updates: &[(&str, String)],
    ) -> Result<usize> {
        self.data.update_row_by_column_pattern(column, value, updates)
    }

    fn write_data(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target, then swap it in
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            writer.write_record(self.data.headers())?;
            for row in self.data.rows() {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
