mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lexdrill_lib::performance::Direction;

#[derive(Parser)]
#[command(name = "lexdrill-cli", about = "Adaptive vocabulary drills", version)]
struct Cli {
    /// Config file (default: <data dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Run an interactive drill session
    Drill {
        /// Language of the posed words
        #[arg(long)]
        source: Option<String>,
        /// Language to answer in
        #[arg(long)]
        target: Option<String>,
        /// Maximum number of cards
        #[arg(short = 'n', long)]
        cards: Option<usize>,
        /// Side to pose: source or translation
        #[arg(long)]
        direction: Option<Direction>,
        /// Comma-separated vocab types (exact match)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
        /// Comma-separated categories (any match)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
        /// Seed for a reproducible card draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate new vocabulary
    Generate {
        /// Number of entries
        n: usize,
        /// Language (default: session source language)
        #[arg(long)]
        language: Option<String>,
        /// Comma-separated vocab types
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
        /// Comma-separated categories
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
        /// Show results without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// Translate entries into other languages
    Translate {
        /// Language to translate from (default: session source language)
        #[arg(long)]
        from: Option<String>,
        /// Comma-separated target languages (default: session target language)
        #[arg(long, value_delimiter = ',')]
        to: Vec<String>,
        /// Only entries with these vocab types
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
        /// Show results without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate example sentences for entries
    Sentences {
        /// Language of the base entries (default: session source language)
        #[arg(long)]
        language: Option<String>,
        /// Only entries with these vocab types
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
        /// Sentences per entry (default: from config)
        #[arg(long)]
        count: Option<usize>,
        /// Maximum number of base entries
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Include entries that already have example sentences
        #[arg(long)]
        all: bool,
        /// Show results without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored entries
    List {
        #[arg(long)]
        language: Option<String>,
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// List categories with entry counts
    Categories,

    /// Show performance and selection weights per card
    Stats {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        direction: Option<Direction>,
    },

    /// Rewrite the backing table's statistics from the ledger
    Align {
        #[arg(long)]
        direction: Option<Direction>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut app = app::App::new(cli.config.as_deref(), cli.data_dir.as_deref())?;

    match cli.command {
        Command::Drill { source, target, cards, direction, types, categories, seed } => {
            let args = commands::drill::DrillArgs {
                source,
                target,
                cards,
                direction,
                types,
                categories,
                seed,
            };
            commands::drill::run(&mut app, args, &cli.format).await?;
        }
        Command::Generate { n, language, types, categories, dry_run } => {
            commands::generate::run(&mut app, n, language, types, categories, dry_run, &cli.format).await?;
        }
        Command::Translate { from, to, types, dry_run } => {
            commands::translate::run(&mut app, from, to, types, dry_run, &cli.format).await?;
        }
        Command::Sentences { language, types, count, limit, all, dry_run } => {
            let args = commands::sentences::SentenceArgs {
                language,
                types,
                count,
                limit,
                all,
                dry_run,
            };
            commands::sentences::run(&mut app, args, &cli.format).await?;
        }
        Command::List { language, types, category } => {
            commands::list::run(&app, language.as_deref(), &types, category.as_deref(), &cli.format)?;
        }
        Command::Categories => {
            commands::categories::run(&app, &cli.format)?;
        }
        Command::Stats { source, target, direction } => {
            commands::stats::run(&app, source, target, direction, &cli.format)?;
        }
        Command::Align { direction } => {
            commands::align::run(&app, direction, &cli.format)?;
        }
    }

    Ok(())
}
