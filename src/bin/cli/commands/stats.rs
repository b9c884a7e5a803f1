use anyhow::Result;

use lexdrill_lib::performance::Direction;
use lexdrill_lib::selection::algorithm::{relative_weights, weight_exponent};
use lexdrill_lib::selection::{build_candidate_pool, CardFilter};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    source: Option<String>,
    target: Option<String>,
    direction: Option<Direction>,
    format: &OutputFormat,
) -> Result<()> {
    let session = &app.config.session;
    let source = source.unwrap_or_else(|| session.source_language.clone());
    let target = target.unwrap_or_else(|| session.target_language.clone());
    let direction = direction.unwrap_or(session.direction);
    let neutral = app.config.selection.neutral_rating;

    let pool = build_candidate_pool(
        &app.store,
        &app.ledger,
        &source,
        &target,
        &CardFilter::default(),
        direction,
    );

    let exponents: Vec<f64> = pool
        .iter()
        .map(|candidate| weight_exponent(&candidate.aggregate, neutral))
        .collect();
    let mut rows: Vec<(f64, &_)> = relative_weights(&exponents).into_iter().zip(pool.iter()).collect();
    rows.sort_by(|a, b| b.0.total_cmp(&a.0));
    let total_weight: f64 = rows.iter().map(|(w, _)| w).sum();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = rows
                .iter()
                .map(|(weight, c)| {
                    serde_json::json!({
                        "meaningEn": c.card.meaning_en(),
                        "source": c.card.source.word,
                        "translation": c.card.target.word,
                        "direction": direction,
                        "numRatings": c.aggregate.num_ratings,
                        "overallRating": c.aggregate.overall_rating,
                        "average": c.aggregate.average(),
                        "lastCheck": c.aggregate.last_check,
                        "relativeWeight": weight,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if rows.is_empty() {
                println!("No cards for {} -> {}.", source, target);
                return Ok(());
            }

            println!("{:<24} {:<24} {:>5} {:>7} {:>7}", "Source", "Translation", "Tries", "Avg", "Share");
            for (weight, c) in &rows {
                let average = c
                    .aggregate
                    .average()
                    .map(|a| format!("{:.1}", a))
                    .unwrap_or_else(|| "-".to_string());
                let share = if total_weight > 0.0 { weight / total_weight * 100.0 } else { 0.0 };
                println!(
                    "{:<24} {:<24} {:>5} {:>7} {:>6.1}%",
                    c.card.source.word, c.card.target.word, c.aggregate.num_ratings, average, share
                );
            }
            println!("\n{} cards, {} attempts in ledger", rows.len(), app.ledger.len());
        }
    }

    Ok(())
}
