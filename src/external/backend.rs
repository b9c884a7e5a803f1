//! Generator / evaluator boundary.
//!
//! Both take a prompt key, its parameters and the JSON schema the reply has to
//! follow, and return the structured reply as a `serde_json::Value`.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::i18n::LocaleError;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Missing credentials: environment variable {0} is not set")]
    MissingCredentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend reply: {0}")]
    MalformedReply(String),

    #[error("Prompt error: {0}")]
    Prompt(#[from] LocaleError),
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// One structured call to a language backend
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub prompt_key: String,
    pub params: Map<String, Value>,
    pub schema: Value,
}

impl BackendRequest {
    pub fn new(prompt_key: &str, schema: Value) -> Self {
        Self {
            prompt_key: prompt_key.to_string(),
            params: Map::new(),
            schema,
        }
    }

    /// Add a prompt parameter. Values that fail to serialize become `null`.
    pub fn param<T: Serialize>(mut self, name: &str, value: T) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.params.insert(name.to_string(), value);
        self
    }
}

/// Produces new content (vocabulary, translations, example sentences)
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: BackendRequest) -> Result<Value>;
}

/// Rates a learner's answer
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, request: BackendRequest) -> Result<Value>;
}
