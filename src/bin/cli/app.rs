use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use lexdrill_lib::config::{AppConfig, DataLayout};
use lexdrill_lib::external::OpenAiBackend;
use lexdrill_lib::i18n::Localization;
use lexdrill_lib::ingestion::IngestionPipeline;
use lexdrill_lib::performance::PerformanceLedger;
use lexdrill_lib::table::CsvTable;
use lexdrill_lib::vocabulary::EntryStore;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub layout: DataLayout,
    pub localization: Arc<Localization>,
    pub store: EntryStore,
    pub ledger: PerformanceLedger,
}

impl App {
    /// Load config, prepare the data directory and open the store and ledger
    pub fn new(config_path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path, data_dir).context("Failed to load configuration")?;
        let layout = config.layout().context("Failed to get data directory")?;
        layout.init().context("Failed to initialize data directory")?;

        let localization = Localization::load(
            config.locale_dir.as_deref(),
            &config.locale,
            &config.fallback_locale,
        )
        .context("Failed to load text catalog")?;

        let store = EntryStore::open(layout.vocabulary_dir()).context("Failed to open vocabulary store")?;
        let ledger =
            PerformanceLedger::open(layout.performance_path()).context("Failed to open performance ledger")?;

        log::debug!(
            "Opened {} entries and {} attempts under {:?}",
            store.len(),
            ledger.len(),
            layout.root()
        );

        Ok(Self {
            config,
            layout,
            localization: Arc::new(localization),
            store,
            ledger,
        })
    }

    /// Language backend used for generation and evaluation
    pub fn backend(&self) -> Result<Arc<OpenAiBackend>> {
        let backend = OpenAiBackend::from_config(&self.config.backend, self.localization.clone())
            .context("Failed to set up language backend")?;
        Ok(Arc::new(backend))
    }

    pub fn pipeline(&self) -> Result<IngestionPipeline> {
        Ok(IngestionPipeline::new(self.backend()?))
    }

    /// The configured backing table, if any
    pub fn table(&self) -> Result<Option<CsvTable>> {
        match self.config.table_path(&self.layout) {
            Some(path) => {
                let table = CsvTable::open(path.clone())
                    .with_context(|| format!("Failed to open backing table {}", path.display()))?;
                Ok(Some(table))
            }
            None => Ok(None),
        }
    }
}
