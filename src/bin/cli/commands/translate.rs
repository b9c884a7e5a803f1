use anyhow::{Context, Result};

use crate::app::App;
use crate::commands::list::print_entries;
use crate::OutputFormat;

pub async fn run(
    app: &mut App,
    from: Option<String>,
    to: Vec<String>,
    vocab_types: Vec<String>,
    dry_run: bool,
    format: &OutputFormat,
) -> Result<()> {
    let source_language = from.unwrap_or_else(|| app.config.session.source_language.clone());
    let targets = if to.is_empty() {
        vec![app.config.session.target_language.clone()]
    } else {
        to
    };

    let pipeline = app.pipeline()?;
    let report = pipeline
        .translate_into(
            &mut app.store,
            &source_language,
            &targets,
            &vocab_types,
            app.config.ingestion.translation_batch_size,
            !dry_run,
        )
        .await
        .context("Translation failed")?;

    for (language, error) in &report.failures {
        eprintln!("Translation into {} failed: {}", language, error);
    }

    let entries: Vec<_> = report.entries.iter().collect();
    print_entries(&entries, format)
}
