//! Back-propagation of ledger aggregates into the backing table.
//!
//! Both operations recompute from the ledger and overwrite, so running them
//! twice leaves the table unchanged.

use super::{
    Result, TableClient, LAST_CHECK_COLUMN, NUM_RATINGS_COLUMN, OVERALL_RATING_COLUMN, SOURCE_COLUMN,
    TRANSLATION_COLUMN,
};
use crate::performance::{Direction, PerformanceAggregate, PerformanceLedger};

fn statistics(aggregate: &PerformanceAggregate) -> Vec<(&'static str, String)> {
    vec![
        (LAST_CHECK_COLUMN, aggregate.last_check_text()),
        (OVERALL_RATING_COLUMN, aggregate.overall_rating.to_string()),
        (NUM_RATINGS_COLUMN, aggregate.num_ratings.to_string()),
    ]
}

/// Write the aggregate of one pair to the rows holding `source_word`.
/// A pair missing from the table is appended. Does not flush.
pub fn align_pair(
    table: &mut dyn TableClient,
    ledger: &PerformanceLedger,
    source_word: &str,
    translation_word: &str,
    direction: Direction,
) -> Result<()> {
    let aggregate = ledger.aggregate(source_word, translation_word, direction);
    let mut updates = statistics(&aggregate);

    let known = table
        .rows()
        .iter()
        .any(|row| table.cell(row, SOURCE_COLUMN) == Some(source_word));
    if !known {
        updates.push((TRANSLATION_COLUMN, translation_word.to_string()));
    }

    table.update_row_by_column_pattern(SOURCE_COLUMN, source_word, &updates)?;
    Ok(())
}

/// Recompute every row of the table from the ledger, then flush.
/// Returns the number of rows aligned.
pub fn align_all(
    table: &mut dyn TableClient,
    ledger: &PerformanceLedger,
    direction: Direction,
) -> Result<usize> {
    let pairs: Vec<(String, String)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let source = table.cell(row, SOURCE_COLUMN)?.trim();
            let translation = table.cell(row, TRANSLATION_COLUMN).unwrap_or_default().trim();
            (!source.is_empty()).then(|| (source.to_string(), translation.to_string()))
        })
        .collect();

    let aggregates = ledger.aggregates();
    for (source, translation) in &pairs {
        let aggregate = aggregates
            .get(&(source.clone(), translation.clone(), direction))
            .copied()
            .unwrap_or_default();
        table.update_row_by_column_pattern(SOURCE_COLUMN, source, &statistics(&aggregate))?;
    }

    table.write_data()?;
    log::debug!("Aligned {} table rows with the ledger", pairs.len());
    Ok(pairs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::AttemptRecord;
    use crate::table::MemoryTable;

    fn ledger() -> PerformanceLedger {
        let mut ledger = PerformanceLedger::in_memory();
        ledger
            .record(AttemptRecord::new("chien", "Hund", Direction::Source, "Hund", 90, ""))
            .unwrap();
        ledger
            .record(AttemptRecord::skipped("chien", "Hund", Direction::Source))
            .unwrap();
        ledger
            .record(AttemptRecord::new("chien", "Hund", Direction::Translation, "chien", 70, ""))
            .unwrap();
        ledger
    }

    #[test]
    fn test_align_all_is_idempotent() {
        let mut table = MemoryTable::default();
        table.push_row(&[(SOURCE_COLUMN, "chien"), (TRANSLATION_COLUMN, "Hund")]);
        table.push_row(&[(SOURCE_COLUMN, "chat"), (TRANSLATION_COLUMN, "Katze")]);
        let ledger = ledger();

        assert_eq!(align_all(&mut table, &ledger, Direction::Source).unwrap(), 2);
        let first = table.clone();
        align_all(&mut table, &ledger, Direction::Source).unwrap();
        assert_eq!(table, first);

        let dog = &table.rows()[0];
        assert_eq!(table.cell(dog, OVERALL_RATING_COLUMN), Some("89"));
        assert_eq!(table.cell(dog, NUM_RATINGS_COLUMN), Some("2"));
        assert!(!table.cell(dog, LAST_CHECK_COLUMN).unwrap().is_empty());

        let cat = &table.rows()[1];
        assert_eq!(table.cell(cat, NUM_RATINGS_COLUMN), Some("0"));
        assert_eq!(table.cell(cat, LAST_CHECK_COLUMN), Some(""));
    }

    #[test]
    fn test_align_all_uses_direction() {
        let mut table = MemoryTable::default();
        table.push_row(&[(SOURCE_COLUMN, "chien"), (TRANSLATION_COLUMN, "Hund")]);

        align_all(&mut table, &ledger(), Direction::Translation).unwrap();
        let dog = &table.rows()[0];
        assert_eq!(table.cell(dog, OVERALL_RATING_COLUMN), Some("70"));
        assert_eq!(table.cell(dog, NUM_RATINGS_COLUMN), Some("1"));
    }

    #[test]
    fn test_align_pair_appends_missing_row() {
        let mut table = MemoryTable::default();
        align_pair(&mut table, &ledger(), "chien", "Hund", Direction::Source).unwrap();

        assert_eq!(table.rows().len(), 1);
        let row = &table.rows()[0];
        assert_eq!(table.cell(row, TRANSLATION_COLUMN), Some("Hund"));
        assert_eq!(table.cell(row, NUM_RATINGS_COLUMN), Some("2"));

        align_pair(&mut table, &ledger(), "chien", "Hund", Direction::Source).unwrap();
        assert_eq!(table.rows().len(), 1);
    }
}
