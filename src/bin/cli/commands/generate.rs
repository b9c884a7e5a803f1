use anyhow::{Context, Result};

use lexdrill_lib::ingestion::GenerationRequest;

use crate::app::App;
use crate::commands::list::print_entries;
use crate::OutputFormat;

pub async fn run(
    app: &mut App,
    n: usize,
    language: Option<String>,
    vocab_types: Vec<String>,
    categories: Vec<String>,
    dry_run: bool,
    format: &OutputFormat,
) -> Result<()> {
    let language = language.unwrap_or_else(|| app.config.session.source_language.clone());
    let request = GenerationRequest::new(n, &language, app.config.ingestion.batch_size)
        .with_categories(categories)
        .with_vocab_types(vocab_types);

    let pipeline = app.pipeline()?;
    let entries = pipeline
        .generate_into(&mut app.store, &request, !dry_run)
        .await
        .context("Vocabulary generation failed")?;

    if entries.len() < n {
        eprintln!("Only {} of {} requested entries were new.", entries.len(), n);
    }

    let entries: Vec<_> = entries.iter().collect();
    print_entries(&entries, format)
}
