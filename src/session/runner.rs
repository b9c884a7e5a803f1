use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::unit::{CardEnv, CardOutcome, CardResult, LearningUnit, OutcomeStatus};
use super::{Learner, Result, SessionError, SessionEvent};
use crate::config::SessionConfig;
use crate::external::{Evaluator, SilentSpeaker, Speaker};
use crate::performance::{Direction, PerformanceLedger};
use crate::selection::{build_candidate_pool, Candidate, CardFilter, Selector};
use crate::table::{align_all, align_pair, TableClient};
use crate::vocabulary::EntryStore;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub source_language: String,
    pub target_language: String,
    /// Upper bound on cards per session; fewer are drawn when the pool is smaller
    pub cards: usize,
    pub direction: Direction,
    pub filter: CardFilter,
}

impl SessionOptions {
    pub fn new(source_language: &str, target_language: &str, cards: usize) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            cards,
            direction: Direction::default(),
            filter: CardFilter::default(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.source_language, &config.target_language, config.cards_per_session)
            .with_direction(config.direction)
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_filter(mut self, filter: CardFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Summary of a finished session, stored as one JSON file per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source_language: String,
    pub target_language: String,
    pub direction: Direction,
    /// The learner left before the last card
    pub quit: bool,
    pub cards: Vec<CardOutcome>,
}

impl SessionReport {
    /// Mean score over cards that were not aborted (skips count as 0)
    pub fn average_score(&self) -> Option<f64> {
        let scores: Vec<i32> = self
            .cards
            .iter()
            .filter(|c| c.status != OutcomeStatus::Aborted)
            .map(|c| c.score)
            .collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().map(|&s| f64::from(s)).sum::<f64>() / scores.len() as f64)
    }

    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.started_at.format("%Y%m%d-%H%M%S"), self.id)
    }

    pub fn save(&self, directory: &Path) -> Result<PathBuf> {
        fs::create_dir_all(directory)?;
        let path = directory.join(self.file_name());
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct Session {
    options: SessionOptions,
    selector: Selector,
    evaluator: Arc<dyn Evaluator>,
    speaker: Box<dyn Speaker>,
    table: Option<Box<dyn TableClient>>,
    report_dir: Option<PathBuf>,
}

impl Session {
    pub fn new(options: SessionOptions, selector: Selector, evaluator: Arc<dyn Evaluator>) -> Result<Self> {
        if options.source_language == options.target_language {
            return Err(SessionError::InvalidConfiguration(format!(
                "source and target language must differ (both are '{}')",
                options.source_language
            )));
        }

        Ok(Self {
            options,
            selector,
            evaluator,
            speaker: Box::new(SilentSpeaker),
            table: None,
            report_dir: None,
        })
    }

    pub fn with_speaker(mut self, speaker: Box<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn with_table(mut self, table: Box<dyn TableClient>) -> Self {
        self.table = Some(table);
        self
    }

    pub fn with_report_dir(mut self, directory: PathBuf) -> Self {
        self.report_dir = Some(directory);
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn table(&self) -> Option<&dyn TableClient> {
        self.table.as_deref()
    }

    /// Draw this session's cards: the whole candidate pool is weighted and
    /// at most `options.cards` distinct cards are taken.
    pub fn select_cards(&mut self, store: &EntryStore, ledger: &PerformanceLedger) -> Result<Vec<Candidate>> {
        let options = &self.options;
        let pool = build_candidate_pool(
            store,
            ledger,
            &options.source_language,
            &options.target_language,
            &options.filter,
            options.direction,
        );

        let n = options.cards.min(pool.len());
        log::debug!("Drawing {} of {} candidate cards", n, pool.len());
        Ok(self.selector.select(pool, n)?)
    }

    pub async fn run(
        &mut self,
        store: &EntryStore,
        ledger: &mut PerformanceLedger,
        learner: &mut dyn Learner,
    ) -> Result<SessionReport> {
        let started_at = Utc::now();
        let selected = self.select_cards(store, ledger)?;
        let direction = self.options.direction;

        let mut report = SessionReport {
            id: Uuid::new_v4(),
            started_at,
            finished_at: started_at,
            source_language: self.options.source_language.clone(),
            target_language: self.options.target_language.clone(),
            direction,
            quit: false,
            cards: Vec::with_capacity(selected.len()),
        };

        if selected.is_empty() {
            learner.notify(SessionEvent::EmptyPool);
        }

        let env = CardEnv {
            store,
            speaker: self.speaker.as_ref(),
            evaluator: self.evaluator.as_ref(),
        };

        let total = selected.len();
        for (index, candidate) in selected.iter().enumerate() {
            learner.notify(SessionEvent::CardStarted { index: index + 1, total });

            let card = &candidate.card;
            let mut unit = LearningUnit::new(card, direction).with_seed(self.selector.derive_seed());
            match unit.run(&env, ledger, learner).await? {
                CardResult::Quit => {
                    log::info!("Learner quit after {} of {} cards", index, total);
                    report.quit = true;
                    break;
                }
                CardResult::Completed(outcome) => {
                    if outcome.status != OutcomeStatus::Aborted {
                        if let Some(table) = self.table.as_deref_mut() {
                            if let Err(e) = align_pair(table, ledger, &card.source.word, &card.target.word, direction) {
                                log::warn!("Failed to update table row for '{}': {}", card.source.word, e);
                            }
                        }
                    }
                    report.cards.push(outcome);
                }
            }
        }

        if let Some(table) = self.table.as_deref_mut() {
            if let Err(e) = align_all(table, ledger, direction) {
                log::warn!("Failed to align backing table: {}", e);
            }
        }

        report.finished_at = Utc::now();
        if let Some(directory) = &self.report_dir {
            if !report.cards.is_empty() {
                match report.save(directory) {
                    Ok(path) => log::debug!("Session report written to {:?}", path),
                    Err(e) => log::warn!("Failed to write session report: {}", e),
                }
            }
        }

        learner.notify(SessionEvent::Finished {
            count: report.cards.len(),
            average: report.average_score(),
        });
        Ok(report)
    }
}
