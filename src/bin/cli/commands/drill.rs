use std::io;

use anyhow::{Context, Result};

use lexdrill_lib::external::speaker_from_config;
use lexdrill_lib::performance::Direction;
use lexdrill_lib::selection::{CardFilter, Selector};
use lexdrill_lib::session::{Session, SessionOptions, TerminalLearner};

use crate::app::App;
use crate::OutputFormat;

pub struct DrillArgs {
    pub source: Option<String>,
    pub target: Option<String>,
    pub cards: Option<usize>,
    pub direction: Option<Direction>,
    pub types: Vec<String>,
    pub categories: Vec<String>,
    pub seed: Option<u64>,
}

pub async fn run(app: &mut App, args: DrillArgs, format: &OutputFormat) -> Result<()> {
    let mut options = SessionOptions::from_config(&app.config.session).with_filter(CardFilter {
        vocab_types: args.types,
        categories: args.categories,
    });
    if let Some(source) = args.source {
        options.source_language = source;
    }
    if let Some(target) = args.target {
        options.target_language = target;
    }
    if let Some(cards) = args.cards {
        options.cards = cards;
    }
    if let Some(direction) = args.direction {
        options.direction = direction;
    }

    let neutral = app.config.selection.neutral_rating;
    let selector = match args.seed {
        Some(seed) => Selector::with_seed(neutral, seed),
        None => Selector::new(neutral),
    }
    .context("Invalid selection settings")?;

    let mut session = Session::new(options, selector, app.backend()?)?
        .with_speaker(speaker_from_config(&app.config.speech))
        .with_report_dir(app.layout.sessions_dir());
    if let Some(table) = app.table()? {
        session = session.with_table(Box::new(table));
    }

    let mut learner = TerminalLearner::new(io::stdin().lock(), io::stdout(), app.localization.clone());
    let report = session
        .run(&app.store, &mut app.ledger, &mut learner)
        .await
        .context("Drill session failed")?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
