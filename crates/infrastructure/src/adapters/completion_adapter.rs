//! HTTP completion adapter - Implements CompletionPort over the hosted API
//!
//! Talks to a completion endpoint with the common `POST /v1/completions`
//! shape: prompt in, generated text plus usage out.

use std::time::{Duration, Instant};

use application::{
    error::ApplicationError,
    ports::{CompletionPort, CompletionReply, CompletionRequest},
};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::CompletionConfig;

/// Wire request accepted by the completion service
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Wire response returned by the completion service
#[derive(Debug, Deserialize)]
struct WireResponse {
    text: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    total_tokens: u32,
}

/// Adapter for the hosted completion API
#[derive(Debug)]
pub struct HttpCompletionAdapter {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl HttpCompletionAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: CompletionConfig) -> Result<Self, ApplicationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApplicationError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn health_url(&self) -> String {
        format!("{}/health", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionPort for HttpCompletionAdapter {
    #[instrument(skip(self, request), fields(prompt_len = request.prompt.len()))]
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionReply, ApplicationError> {
        let wire = WireRequest {
            model: &self.config.model,
            prompt: &request.prompt,
            system: request.system.as_deref(),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature,
        };

        let mut builder = self.client.post(self.completions_url()).json(&wire);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Completion request failed to send");
            ApplicationError::ExternalService(format!("completion request failed: {e}"))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ApplicationError::RateLimited);
        }
        if !status.is_success() {
            return Err(ApplicationError::ExternalService(format!(
                "completion service returned {status}"
            )));
        }

        let body: WireResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Completion response was not valid JSON");
            ApplicationError::Completion(format!("invalid completion response: {e}"))
        })?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(latency_ms, "Completion call succeeded");

        Ok(CompletionReply {
            content: body.text,
            model: body.model.unwrap_or_else(|| self.config.model.clone()),
            tokens_used: body.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }

    async fn is_healthy(&self) -> bool {
        match self.client.get(self.health_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
