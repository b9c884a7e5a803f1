//! OpenAI-compatible chat completions backend.
//!
//! Prompts are rendered from the localization catalog; replies are requested
//! in strict JSON-schema mode and parsed back into `serde_json::Value`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::backend::{BackendError, BackendRequest, Evaluator, Generator, Result};
use crate::config::{BackendConfig, ModelProfile};
use crate::i18n::Localization;

pub struct OpenAiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    generation: ModelProfile,
    evaluation: ModelProfile,
    localization: Arc<Localization>,
}

impl OpenAiBackend {
    /// Build the backend; fails when the configured API key variable is unset.
    pub fn from_config(config: &BackendConfig, localization: Arc<Localization>) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BackendError::MissingCredentials(config.api_key_env.clone()))?;

        Ok(Self::new(config, api_key, localization))
    }

    pub fn new(config: &BackendConfig, api_key: String, localization: Arc<Localization>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            generation: config.generation.clone(),
            evaluation: config.evaluation.clone(),
            localization,
        }
    }

    fn request_body(&self, profile: &ModelProfile, request: &BackendRequest) -> Result<Value> {
        let prompt = self.localization.render(&request.prompt_key, &request.params)?;
        let schema_name: String = request
            .prompt_key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        Ok(json!({
            "model": profile.model,
            "reasoning_effort": profile.reasoning_effort,
            "messages": [{ "role": "user", "content": prompt }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": request.schema,
                }
            }
        }))
    }

    async fn complete(&self, profile: &ModelProfile, request: BackendRequest) -> Result<Value> {
        let body = self.request_body(profile, &request)?;
        log::debug!("Calling {} for prompt {}", profile.model, request.prompt_key);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: Value = response.json().await?;
        parse_reply(&reply)
    }
}

/// Extract the structured payload from a chat completion reply
fn parse_reply(reply: &Value) -> Result<Value> {
    let content = reply
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::MalformedReply("reply has no message content".into()))?;

    serde_json::from_str(content)
        .map_err(|e| BackendError::MalformedReply(format!("content is not JSON: {}", e)))
}

#[async_trait]
impl Generator for OpenAiBackend {
    async fn generate(&self, request: BackendRequest) -> Result<Value> {
        self.complete(&self.generation, request).await
    }
}

#[async_trait]
impl Evaluator for OpenAiBackend {
    async fn evaluate(&self, request: BackendRequest) -> Result<Value> {
        self.complete(&self.evaluation, request).await
    }
}
