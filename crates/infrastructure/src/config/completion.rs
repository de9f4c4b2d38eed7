//! Hosted completion API configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Configuration for the hosted completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of the completion API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API token, sent as a bearer header when present (sensitive)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model identifier requested from the service
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Default token budget per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "http://localhost:8089".to_string()
}

fn default_model() -> String {
    "finsight-analyst-v2".to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_max_tokens() -> u32 {
    512
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}
