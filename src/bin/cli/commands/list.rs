use anyhow::Result;

use lexdrill_lib::vocabulary::VocabEntry;

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    language: Option<&str>,
    vocab_types: &[String],
    category: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let mut entries: Vec<&VocabEntry> = app
        .store
        .iter()
        .filter(|e| language.map_or(true, |l| e.language() == l))
        .filter(|e| vocab_types.is_empty() || e.vocab_types() == vocab_types)
        .filter(|e| category.map_or(true, |c| e.categories.iter().any(|ec| ec == c)))
        .collect();

    entries.sort_by(|a, b| {
        a.language()
            .cmp(b.language())
            .then_with(|| a.meaning_en().cmp(b.meaning_en()))
    });

    print_entries(&entries, format)
}

/// Print entries in the requested format
pub fn print_entries(entries: &[&VocabEntry], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No entries found.");
                return Ok(());
            }
            for entry in entries {
                let links = entry.linked_items().len();
                if links > 0 {
                    println!("{} [{} links]", entry, links);
                } else {
                    println!("{}", entry);
                }
            }
            println!("\n{} entries", entries.len());
        }
    }

    Ok(())
}
