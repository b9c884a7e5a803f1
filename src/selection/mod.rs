//! Card selection for drill sessions
//!
//! This module provides:
//! - Candidate pool construction from the entry store and ledger
//! - Performance-biased weights (weak items are shown more often)
//! - Weighted sampling without replacement

pub mod algorithm;
pub mod pool;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::performance::PerformanceAggregate;

pub use algorithm::{sampling_weight, SelectionError, DEFAULT_NEUTRAL_RATING};
pub use pool::{build_candidate_pool, pair_key, Candidate, CardFilter};

/// Draws batches of cards, favoring items the learner struggles with
pub struct Selector {
    neutral: f64,
    rng: StdRng,
}

impl Selector {
    pub fn new(neutral: f64) -> algorithm::Result<Self> {
        algorithm::validate_neutral(neutral)?;
        Ok(Self {
            neutral,
            rng: StdRng::from_entropy(),
        })
    }

    /// Deterministic selector for reproducible draws
    pub fn with_seed(neutral: f64, seed: u64) -> algorithm::Result<Self> {
        algorithm::validate_neutral(neutral)?;
        Ok(Self {
            neutral,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Seed for a dependent generator (hint choice), drawn from this
    /// selector's stream so a seeded session stays reproducible.
    pub fn derive_seed(&mut self) -> u64 {
        self.rng.gen()
    }

    pub fn neutral(&self) -> f64 {
        self.neutral
    }

    pub fn weight(&self, aggregate: &PerformanceAggregate) -> f64 {
        sampling_weight(aggregate, self.neutral)
    }

    /// Draw `n` distinct candidates. Asking for more than the pool holds is an
    /// error; the pool is never silently truncated.
    pub fn select(&mut self, pool: Vec<Candidate>, n: usize) -> algorithm::Result<Vec<Candidate>> {
        self.select_by(pool, n, |c| &c.aggregate)
    }

    /// Generic form of [`Selector::select`] for any item carrying an aggregate
    pub fn select_by<T, F>(&mut self, items: Vec<T>, n: usize, aggregate: F) -> algorithm::Result<Vec<T>>
    where
        F: Fn(&T) -> &PerformanceAggregate,
    {
        let exponents: Vec<f64> = items
            .iter()
            .map(|item| algorithm::weight_exponent(aggregate(item), self.neutral))
            .collect();
        let picked = algorithm::sample_without_replacement(&exponents, n, &mut self.rng)?;

        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        Ok(picked
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{LearningCard, VocabEntry};
    use std::collections::HashSet;

    fn candidate(meaning: &str, overall: i64, num: usize) -> Candidate {
        let types = vec!["noun".to_string()];
        let source = VocabEntry::new(meaning, "fr", types.clone()).unwrap().with_word(format!("fr-{}", meaning));
        let target = VocabEntry::new(meaning, "de", types).unwrap().with_word(format!("de-{}", meaning));
        Candidate {
            card: LearningCard::new(source, target).unwrap(),
            aggregate: PerformanceAggregate {
                overall_rating: overall,
                num_ratings: num,
                last_check: None,
            },
        }
    }

    fn pool(size: usize) -> Vec<Candidate> {
        (0..size).map(|i| candidate(&format!("m{}", i), (i as i64) * 10, 1)).collect()
    }

    #[test]
    fn test_select_never_duplicates() {
        let mut selector = Selector::with_seed(DEFAULT_NEUTRAL_RATING, 11).unwrap();
        for n in 0..=8 {
            let picked = selector.select(pool(8), n).unwrap();
            assert_eq!(picked.len(), n);
            let meanings: HashSet<_> = picked.iter().map(|c| c.card.meaning_en().to_string()).collect();
            assert_eq!(meanings.len(), n);
        }
    }

    #[test]
    fn test_select_rejects_more_than_pool() {
        let mut selector = Selector::with_seed(DEFAULT_NEUTRAL_RATING, 11).unwrap();
        assert!(matches!(
            selector.select(pool(3), 4),
            Err(SelectionError::PoolExhausted { requested: 4, available: 3 })
        ));
    }

    #[test]
    fn test_select_empty_pool() {
        let mut selector = Selector::with_seed(DEFAULT_NEUTRAL_RATING, 11).unwrap();
        assert!(selector.select(Vec::new(), 0).unwrap().is_empty());
        assert!(selector.select(Vec::new(), 1).is_err());
    }

    #[test]
    fn test_weak_cards_are_drawn_first_more_often() {
        let mut selector = Selector::with_seed(DEFAULT_NEUTRAL_RATING, 5).unwrap();
        let mut weak_first = 0;
        for _ in 0..500 {
            let pool = vec![
                candidate("known", 400, 4),
                candidate("weak", 40, 4),
            ];
            let picked = selector.select(pool, 1).unwrap();
            if picked[0].card.meaning_en() == "weak" {
                weak_first += 1;
            }
        }
        // weights 2^-4 vs 2^3.2
        assert!(weak_first > 480, "got {}", weak_first);
    }

    #[test]
    fn test_rejects_invalid_neutral() {
        assert!(Selector::new(0.0).is_err());
        assert!(Selector::new(-5.0).is_err());
    }
}
