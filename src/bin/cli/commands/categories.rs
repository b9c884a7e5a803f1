use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let categories: Vec<(String, usize)> = app
        .store
        .categories()
        .into_iter()
        .map(|category| {
            let count = app.store.iter().filter(|e| e.categories.contains(&category)).count();
            (category, count)
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = categories
                .iter()
                .map(|(category, count)| {
                    serde_json::json!({
                        "category": category,
                        "count": count,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if categories.is_empty() {
                println!("No categories found.");
                return Ok(());
            }

            let width = categories.iter().map(|(c, _)| c.len()).max().unwrap_or(8).max(8);
            println!("{:<width$} Count", "Category", width = width + 1);
            println!("{} {}", "\u{2500}".repeat(width + 1), "\u{2500}".repeat(6));
            for (category, count) in &categories {
                println!("{:<width$} {}", category, count, width = width + 1);
            }
        }
    }

    Ok(())
}
