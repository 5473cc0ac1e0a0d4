//! Plan model client
//!
//! The gateway talks to the model through [`PlanModel`] so tests can swap in
//! a scripted model. [`OllamaClient`] is the production implementation and
//! calls Ollama's non-streaming `/api/generate` endpoint in JSON mode.

use crate::config::AiConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanModelError {
    #[error("Plan model request failed: {0}")]
    Request(String),

    #[error("Plan model returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Plan model response could not be read: {0}")]
    Parse(String),

    #[error("Plan model returned an empty response")]
    Empty,
}

/// Text-in, text-out plan model
#[async_trait]
pub trait PlanModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, PlanModelError>;

    /// Model name, for logs
    fn name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorResponse {
    error: String,
}

pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl OllamaClient {
    pub fn new(config: &AiConfig) -> Result<Self, PlanModelError> {
        Self::new_with_base_url(config, &config.ollama_url)
    }

    /// Point the client at another server, e.g. a mock in tests
    pub fn new_with_base_url(config: &AiConfig, base_url: &str) -> Result<Self, PlanModelError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlanModelError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl PlanModel for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, PlanModelError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions { temperature: 0.7 },
        };

        let mut builder = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PlanModelError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlanModelError::Request(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OllamaErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(PlanModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| PlanModelError::Parse(e.to_string()))?;

        if !parsed.done {
            tracing::warn!(model = %self.model, "Plan model response not marked done");
        }
        if parsed.response.trim().is_empty() {
            return Err(PlanModelError::Empty);
        }
        Ok(parsed.response)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
