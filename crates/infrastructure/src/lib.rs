//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer and owns
//! configuration loading.

pub mod adapters;
pub mod config;

pub use adapters::HttpCompletionAdapter;
pub use config::{
    AppConfig, CompletionConfig, Environment, PathRateLimit, RateLimitQuota, SecurityConfig,
    ServerConfig,
};
