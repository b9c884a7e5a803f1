//! Performance-biased sampling weights
//!
//! Each candidate gets the weight
//!
//! ```text
//! avg    = overall_rating / num_ratings     (neutral when num_ratings == 0)
//! k_eff  = max(num_ratings, 1)
//! weight = 2 ^ (k_eff * (neutral - avg) / neutral)
//! ```
//!
//! Items averaging below the neutral rating are favored, more strongly the
//! more attempts back that average; items above it fade out. An item with no
//! history has weight exactly 1.
//!
//! There is no recency term: `last_check` does not influence the weight.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use thiserror::Error;

use crate::performance::PerformanceAggregate;

/// Pivot rating on the 0-100 scale
pub const DEFAULT_NEUTRAL_RATING: f64 = 50.0;

#[derive(Error, Debug, PartialEq)]
pub enum SelectionError {
    #[error("Requested {requested} cards but only {available} are available")]
    PoolExhausted { requested: usize, available: usize },

    #[error("Neutral rating must be a positive finite number, got {0}")]
    InvalidNeutral(f64),
}

pub type Result<T> = std::result::Result<T, SelectionError>;

pub fn validate_neutral(neutral: f64) -> Result<()> {
    if neutral.is_finite() && neutral > 0.0 {
        Ok(())
    } else {
        Err(SelectionError::InvalidNeutral(neutral))
    }
}

/// Base-2 exponent of the weight for one aggregate
pub fn weight_exponent(aggregate: &PerformanceAggregate, neutral: f64) -> f64 {
    let avg = aggregate.average().unwrap_or(neutral);
    let k_eff = aggregate.num_ratings.max(1) as f64;
    k_eff * (neutral - avg) / neutral
}

pub fn sampling_weight(aggregate: &PerformanceAggregate, neutral: f64) -> f64 {
    weight_exponent(aggregate, neutral).exp2()
}

/// Weights `2^exponent` scaled so the largest is exactly 1.0
pub fn relative_weights(exponents: &[f64]) -> Vec<f64> {
    let max = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    exponents.iter().map(|e| (e - max).exp2()).collect()
}

/// Draw `n` distinct indices, each draw proportional to `2^exponent` among the
/// indices not drawn yet.
///
/// Weights are rescaled against the largest remaining exponent before every
/// draw, so long histories never overflow to infinity or underflow the whole
/// pool to zero.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    exponents: &[f64],
    n: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if n > exponents.len() {
        return Err(SelectionError::PoolExhausted {
            requested: n,
            available: exponents.len(),
        });
    }

    let mut remaining: Vec<usize> = (0..exponents.len()).collect();
    let mut chosen = Vec::with_capacity(n);

    while chosen.len() < n {
        let max = remaining
            .iter()
            .map(|&i| exponents[i])
            .fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = remaining.iter().map(|&i| (exponents[i] - max).exp2()).collect();

        // The maximum always maps to weight 1.0, so the sum is never zero.
        let pick = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..remaining.len()),
        };
        chosen.push(remaining.swap_remove(pick));
    }

    Ok(chosen)
}
