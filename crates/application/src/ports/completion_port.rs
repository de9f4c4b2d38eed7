//! Completion port - Interface to the hosted completion model

use async_trait::async_trait;

use crate::error::ApplicationError;

/// A single completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Optional system instruction
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// Create a plain prompt request
    pub fn simple(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    /// Create a request with a system instruction
    pub fn with_system(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Result of a completion call
#[derive(Debug, Clone)]
pub struct CompletionReply {
    /// Raw generated text
    pub content: String,
    /// Model that produced the reply
    pub model: String,
    /// Number of tokens used, if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Port for completion operations against the hosted model
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Generate a completion for the given request
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionReply, ApplicationError>;

    /// Check if the completion backend is reachable
    async fn is_healthy(&self) -> bool;

    /// Name of the configured model
    fn model_name(&self) -> &str;
}
