//! Append-only attempt ledger.
//!
//! Attempts are kept in a JSONL file (`performance/attempts.jsonl`), one
//! `AttemptRecord` per line. Lines are only ever appended; aggregates are
//! recomputed from the records on demand.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::{AttemptRecord, Direction, PerformanceAggregate};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Aggregation key: (source word, translation word, direction)
pub type PairKey = (String, String, Direction);

pub struct PerformanceLedger {
    /// Backing JSONL file; `None` keeps the ledger in memory only
    path: Option<PathBuf>,
    records: Vec<AttemptRecord>,
}

impl PerformanceLedger {
    /// A ledger without backing storage
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: Vec::new(),
        }
    }

    /// Open (or create) the ledger file at `path` and read existing records.
    /// Lines that fail to parse are skipped.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let records = read_records(&path)?;
        log::debug!("Loaded {} attempt records from {:?}", records.len(), path);
        Ok(Self {
            path: Some(path),
            records,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one attempt. The record only becomes visible in memory once the
    /// line has been written, so a failed write never leaves half a result.
    pub fn record(&mut self, record: AttemptRecord) -> Result<()> {
        if let Some(path) = &self.path {
            append_record(path, &record)?;
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate for one pair; the zero aggregate when nothing matches.
    pub fn aggregate(
        &self,
        source_word: &str,
        translation_word: &str,
        direction: Direction,
    ) -> PerformanceAggregate {
        let mut agg = PerformanceAggregate::default();
        for record in self
            .records
            .iter()
            .filter(|r| r.matches(source_word, translation_word, direction))
        {
            agg.add(record);
        }
        agg
    }

    /// Aggregates for every pair present in the ledger, in one pass
    pub fn aggregates(&self) -> HashMap<PairKey, PerformanceAggregate> {
        let mut map: HashMap<PairKey, PerformanceAggregate> = HashMap::new();
        for record in &self.records {
            map.entry((
                record.source_word.clone(),
                record.translation_word.clone(),
                record.direction,
            ))
            .or_default()
            .add(record);
        }
        map
    }
}

fn read_records(path: &Path) -> Result<Vec<AttemptRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(fs::File::open(path)?);
    let mut records = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<AttemptRecord>(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping ledger line {} in {:?}: {}", line_no + 1, path, e),
        }
    }

    Ok(records)
}

fn append_record(path: &Path, record: &AttemptRecord) -> Result<()> {
    let json = serde_json::to_string(record)?;
    let mut file = OpenOptions::new().create(true).read(true).append(true).open(path)?;
    terminate_torn_line(&mut file, path)?;
    writeln!(file, "{}", json)?;
    Ok(())
}

/// Close off an unterminated last line (an interrupted earlier write) so the
/// next record starts on a line of its own.
fn terminate_torn_line(file: &mut fs::File, path: &Path) -> Result<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        log::warn!("Ledger {:?} ends in a partial line; starting a new one", path);
        file.write_all(b"\n")?;
    }
    Ok(())
}
