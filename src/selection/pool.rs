//! Candidate pool construction.
//!
//! Entries of the two drill languages are joined on `(meaning_en, vocab_types)`;
//! every join that has both sides becomes one `LearningCard`, annotated with
//! the ledger aggregate of its word pair.

use std::collections::{BTreeMap, HashMap};

use crate::performance::{Direction, PairKey, PerformanceAggregate, PerformanceLedger};
use crate::vocabulary::{EntryStore, LearningCard, VocabEntry};

/// Restricts which entries take part in a drill
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    /// Exact `vocab_types` match; empty accepts all
    pub vocab_types: Vec<String>,
    /// Any overlap with the entry's categories; empty accepts all
    pub categories: Vec<String>,
}

impl CardFilter {
    pub fn accepts(&self, entry: &VocabEntry) -> bool {
        let types_ok = self.vocab_types.is_empty() || entry.vocab_types() == self.vocab_types.as_slice();
        let categories_ok = self.categories.is_empty() || entry.has_any_category(&self.categories);
        types_ok && categories_ok
    }
}

/// A card together with the history of its word pair
#[derive(Debug, Clone)]
pub struct Candidate {
    pub card: LearningCard,
    pub aggregate: PerformanceAggregate,
}

/// Ledger key of a card. Pairs are always keyed in row order (source word,
/// then translation word) whichever side is posed.
pub fn pair_key(card: &LearningCard, direction: Direction) -> PairKey {
    (card.source.word.clone(), card.target.word.clone(), direction)
}

/// Join the store's entries into cards from `source_language` to
/// `target_language`. The pool is ordered by meaning, then types.
pub fn build_candidate_pool(
    store: &EntryStore,
    ledger: &PerformanceLedger,
    source_language: &str,
    target_language: &str,
    filter: &CardFilter,
    direction: Direction,
) -> Vec<Candidate> {
    let mut groups: BTreeMap<(&str, &[String]), (Option<&VocabEntry>, Option<&VocabEntry>)> =
        BTreeMap::new();

    for entry in store.iter().filter(|e| filter.accepts(e)) {
        let slot = groups
            .entry((entry.meaning_en(), entry.vocab_types()))
            .or_default();
        if entry.language() == source_language {
            slot.0 = Some(entry);
        } else if entry.language() == target_language {
            slot.1 = Some(entry);
        }
    }

    let aggregates: HashMap<PairKey, PerformanceAggregate> = ledger.aggregates();
    let mut pool = Vec::new();

    for (_, pair) in groups {
        let (Some(source), Some(target)) = pair else {
            continue;
        };
        match LearningCard::new(source.clone(), target.clone()) {
            Ok(card) => {
                let aggregate = aggregates
                    .get(&pair_key(&card, direction))
                    .copied()
                    .unwrap_or_default();
                pool.push(Candidate { card, aggregate });
            }
            Err(e) => log::warn!("Skipping candidate pair: {}", e),
        }
    }

    pool
}
