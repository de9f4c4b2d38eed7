//! Application configuration
//!
//! Split into focused sub-modules by domain:
//! - `server`: HTTP server settings
//! - `security`: Path classes, rate limits, CSRF, auth gate
//! - `completion`: Hosted completion API settings
//!
//! Configuration is constructed once at startup and handed to each
//! component by explicit injection; nothing here is a mutable global.

mod completion;
mod security;
mod server;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use completion::CompletionConfig;
pub use security::{PathRateLimit, RateLimitQuota, SecurityConfig};
pub use server::ServerConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Application environment (development or production)
///
/// Controls cookie security attributes and error detail exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment - relaxed cookie attributes
    #[default]
    Development,
    /// Production environment - Secure cookies, generic error bodies
    Production,
}

impl Environment {
    /// Check whether this is a production deployment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development or production)
    #[serde(default)]
    pub environment: Environment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Security configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Completion API configuration
    #[serde(default)]
    pub completion: CompletionConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional file
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("completion.base_url", "http://localhost:8089")?
            .set_default("completion.model", "finsight-analyst-v2")?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., FINSIGHT_SERVER_PORT)
            .add_source(
                config::Environment::with_prefix("FINSIGHT")
                    .separator("_")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
