use anyhow::{Context, Result};

use lexdrill_lib::vocabulary::{EntryId, Relation, EXAMPLE_SENTENCE_CATEGORY};

use crate::app::App;
use crate::commands::list::print_entries;
use crate::OutputFormat;

pub struct SentenceArgs {
    pub language: Option<String>,
    pub types: Vec<String>,
    pub count: Option<usize>,
    pub limit: usize,
    pub all: bool,
    pub dry_run: bool,
}

pub async fn run(app: &mut App, args: SentenceArgs, format: &OutputFormat) -> Result<()> {
    let language = args
        .language
        .unwrap_or_else(|| app.config.session.source_language.clone());
    let count = args.count.unwrap_or(app.config.ingestion.sentences_per_entry);

    let bases: Vec<EntryId> = app
        .store
        .by_language(&language)
        .into_iter()
        .filter(|e| !e.categories.iter().any(|c| c == EXAMPLE_SENTENCE_CATEGORY))
        .filter(|e| args.types.is_empty() || e.vocab_types() == args.types.as_slice())
        .filter(|e| args.all || e.links(Relation::ExampleSentence).next().is_none())
        .take(args.limit)
        .map(|e| e.id())
        .collect();

    if bases.is_empty() {
        println!("No entries need example sentences.");
        return Ok(());
    }

    let pipeline = app.pipeline()?;
    let report = pipeline
        .link_sentences_into(&mut app.store, &bases, count, !args.dry_run)
        .await
        .context("Sentence generation failed")?;

    for (id, error) in &report.failures {
        let name = app.store.get(*id).map(|e| e.to_string()).unwrap_or_else(|| id.to_string());
        eprintln!("Sentences for {} failed: {}", name, error);
    }

    let sentences: Vec<_> = report.sentences.iter().collect();
    print_entries(&sentences, format)
}
