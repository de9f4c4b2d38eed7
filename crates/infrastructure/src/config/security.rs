//! Security configuration: path classes, rate limits, CSRF, auth gate.

use serde::{Deserialize, Serialize};

use super::default_true;

/// A request-count / window pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitQuota {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl RateLimitQuota {
    /// Create a quota
    #[must_use]
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }
}

/// A per-path-prefix rate limit override
///
/// Declaration order matters: when two prefixes of equal length match a
/// path, the first declared wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRateLimit {
    /// Path prefix the override applies to
    pub prefix: String,
    /// Maximum requests per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl PathRateLimit {
    /// Create an override entry
    #[must_use]
    pub fn new(prefix: impl Into<String>, max_requests: u32, window_ms: u64) -> Self {
        Self {
            prefix: prefix.into(),
            max_requests,
            window_ms,
        }
    }

    /// The quota carried by this override
    #[must_use]
    pub const fn quota(&self) -> RateLimitQuota {
        RateLimitQuota::new(self.max_requests, self.window_ms)
    }
}

/// Security configuration for the request pipeline
///
/// Loaded once at startup and injected into each pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub rate_limit_enabled: bool,

    /// Enable CSRF double-submit validation
    #[serde(default = "default_true")]
    pub csrf_enabled: bool,

    /// Enable security response headers
    #[serde(default = "default_true")]
    pub security_headers_enabled: bool,

    /// Enable the bearer-token auth gate
    #[serde(default = "default_true")]
    pub auth_enabled: bool,

    /// Path prefixes that require a bearer token
    #[serde(default = "default_protected_paths")]
    pub protected_paths: Vec<String>,

    /// Path prefixes that never require a token
    ///
    /// Takes precedence over `protected_paths` when both match.
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    /// Path prefixes served statically; the pipeline skips them entirely
    #[serde(default = "default_static_paths")]
    pub static_paths: Vec<String>,

    /// Fallback quota when no path override matches
    #[serde(default = "default_rate_limit")]
    pub default_rate_limit: RateLimitQuota,

    /// Per-prefix quota overrides (longest matching prefix wins)
    #[serde(default = "default_path_rate_limits")]
    pub path_rate_limits: Vec<PathRateLimit>,

    /// Rate limiter cleanup interval in seconds (default: 300 = 5 minutes)
    #[serde(default = "default_cleanup_interval")]
    pub rate_limit_cleanup_interval_secs: u64,

    /// Minimum accepted bearer token length
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,
}

/// 15 minutes in milliseconds
const FIFTEEN_MINUTES_MS: u64 = 15 * 60 * 1000;
/// 1 minute in milliseconds
const ONE_MINUTE_MS: u64 = 60 * 1000;
/// 1 hour in milliseconds
const ONE_HOUR_MS: u64 = 60 * 60 * 1000;

const fn default_rate_limit() -> RateLimitQuota {
    RateLimitQuota::new(100, FIFTEEN_MINUTES_MS)
}

fn default_path_rate_limits() -> Vec<PathRateLimit> {
    vec![
        PathRateLimit::new("/api/auth", 5, FIFTEEN_MINUTES_MS),
        PathRateLimit::new("/api/predictions", 10, ONE_MINUTE_MS),
        PathRateLimit::new("/api/news/sentiment", 20, ONE_MINUTE_MS),
        PathRateLimit::new("/api/uploads", 5, ONE_HOUR_MS),
    ]
}

fn default_protected_paths() -> Vec<String> {
    vec![
        "/api/users".to_string(),
        "/api/predictions".to_string(),
        "/api/news".to_string(),
        "/api/payments".to_string(),
        "/api/backups".to_string(),
        "/api/logs".to_string(),
        "/api/exports".to_string(),
    ]
}

fn default_public_paths() -> Vec<String> {
    vec![
        "/api/auth".to_string(),
        "/health".to_string(),
        "/ready".to_string(),
    ]
}

fn default_static_paths() -> Vec<String> {
    vec![
        "/static".to_string(),
        "/assets".to_string(),
        "/favicon.ico".to_string(),
    ]
}

const fn default_cleanup_interval() -> u64 {
    300 // 5 minutes
}

const fn default_min_token_length() -> usize {
    16
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            csrf_enabled: true,
            security_headers_enabled: true,
            auth_enabled: true,
            protected_paths: default_protected_paths(),
            public_paths: default_public_paths(),
            static_paths: default_static_paths(),
            default_rate_limit: default_rate_limit(),
            path_rate_limits: default_path_rate_limits(),
            rate_limit_cleanup_interval_secs: default_cleanup_interval(),
            min_token_length: default_min_token_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quota_is_100_per_15_minutes() {
        let config = SecurityConfig::default();
        assert_eq!(config.default_rate_limit.max_requests, 100);
        assert_eq!(config.default_rate_limit.window_ms, 900_000);
    }

    #[test]
    fn auth_endpoints_have_strict_quota() {
        let config = SecurityConfig::default();
        let auth = config
            .path_rate_limits
            .iter()
            .find(|l| l.prefix == "/api/auth")
            .unwrap();
        assert_eq!(auth.max_requests, 5);
        assert_eq!(auth.window_ms, 900_000);
    }

    #[test]
    fn auth_paths_are_both_public_and_rate_limited() {
        let config = SecurityConfig::default();
        assert!(config.public_paths.iter().any(|p| p == "/api/auth"));
        assert!(
            config
                .path_rate_limits
                .iter()
                .any(|l| l.prefix == "/api/auth")
        );
    }

    #[test]
    fn overrides_deserialize_from_toml() {
        let toml_str = r#"
            [[path_rate_limits]]
            prefix = "/api/heavy"
            max_requests = 2
            window_ms = 1000
        "#;
        let config: SecurityConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.path_rate_limits.len(), 1);
        assert_eq!(config.path_rate_limits[0].quota(), RateLimitQuota::new(2, 1000));
    }
}
