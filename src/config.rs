//! Application configuration (`config.toml`) and on-disk layout

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::performance::Direction;
use crate::selection::DEFAULT_NEUTRAL_RATING;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root for all stored data (default: platform local data dir + `lexdrill`)
    pub data_dir: Option<PathBuf>,
    pub locale: String,
    pub fallback_locale: String,
    /// Directory with `<locale>.toml` catalogs overriding the built-in texts
    pub locale_dir: Option<PathBuf>,
    pub selection: SelectionConfig,
    pub session: SessionConfig,
    pub ingestion: IngestionConfig,
    pub backend: BackendConfig,
    pub speech: SpeechConfig,
    pub table: TableConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            locale: "en".to_string(),
            fallback_locale: "en".to_string(),
            locale_dir: None,
            selection: SelectionConfig::default(),
            session: SessionConfig::default(),
            ingestion: IngestionConfig::default(),
            backend: BackendConfig::default(),
            speech: SpeechConfig::default(),
            table: TableConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub neutral_rating: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            neutral_rating: DEFAULT_NEUTRAL_RATING,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub source_language: String,
    pub target_language: String,
    pub cards_per_session: usize,
    pub direction: Direction,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_language: "fr".to_string(),
            target_language: "de".to_string(),
            cards_per_session: 10,
            direction: Direction::Source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub batch_size: usize,
    pub translation_batch_size: usize,
    pub sentences_per_entry: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            translation_batch_size: 20,
            sentences_per_entry: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub model: String,
    pub reasoning_effort: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub generation: ModelProfile,
    pub evaluation: ModelProfile,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            generation: ModelProfile {
                model: "gpt-5".to_string(),
                reasoning_effort: "low".to_string(),
            },
            evaluation: ModelProfile {
                model: "gpt-5-mini".to_string(),
                reasoning_effort: "low".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    pub command: String,
    /// `{lang}` and `{text}` are substituted per utterance
    pub args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: "espeak-ng".to_string(),
            args: vec!["-v".to_string(), "{lang}".to_string(), "{text}".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// CSV file mirroring per-pair aggregates; relative paths resolve against the data dir
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("lexdrill"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `<data_dir>/config.toml` is used
    /// when present, falling back to defaults.
    pub fn load(explicit: Option<&Path>, data_dir_override: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)?
            }
            None => {
                let data_dir = match data_dir_override {
                    Some(dir) => dir.to_path_buf(),
                    None => Self::default_data_dir()?,
                };
                let path = data_dir.join("config.toml");
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    log::debug!("No config at {:?}, using defaults", path);
                    Self::default()
                }
            }
        };

        if let Some(dir) = data_dir_override {
            config.data_dir = Some(dir.to_path_buf());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        log::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.selection.neutral_rating.is_finite() && self.selection.neutral_rating > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "selection.neutral_rating must be positive, got {}",
                self.selection.neutral_rating
            )));
        }
        if self.ingestion.batch_size == 0 || self.ingestion.translation_batch_size == 0 {
            return Err(ConfigError::Invalid("ingestion batch sizes must be at least 1".into()));
        }
        Ok(())
    }

    pub fn layout(&self) -> Result<DataLayout> {
        let root = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => Self::default_data_dir()?,
        };
        Ok(DataLayout::new(root))
    }

    pub fn table_path(&self, layout: &DataLayout) -> Option<PathBuf> {
        self.table.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                layout.root().join(p)
            }
        })
    }
}

/// Maps the logical namespaces onto directories under the data root
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// One JSON file per vocabulary entry
    pub fn vocabulary_dir(&self) -> PathBuf {
        self.root.join("vocabulary")
    }

    /// Append-only attempt ledger
    pub fn performance_path(&self) -> PathBuf {
        self.root.join("performance").join("attempts.jsonl")
    }

    /// One JSON report per finished session
    pub fn sessions_dir(&self) -> PathBuf {
        self.root.join("session")
    }

    /// Initialize storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.vocabulary_dir())?;
        fs::create_dir_all(self.root.join("performance"))?;
        fs::create_dir_all(self.sessions_dir())?;
        Ok(())
    }
}
