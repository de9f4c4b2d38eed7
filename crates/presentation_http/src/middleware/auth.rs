//! Bearer-token auth gate
//!
//! Classifies the request path against the configured public and protected
//! prefix lists and, for protected paths, requires a structurally
//! plausible bearer token: present, non-empty, and at least the configured
//! minimum length. Public classification wins when a path matches both
//! lists, so a public prefix can never be locked out by a broader
//! protected one.
//!
//! Cryptographic token validation (signature, expiry, claims) is the
//! identity provider's job and deliberately out of scope here; this gate
//! only enforces presence and shape.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use infrastructure::SecurityConfig;
use tracing::debug;

/// Path classification against the configured prefix lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    /// Matches a public prefix; never requires a token
    Public,
    /// Matches a protected prefix (and no public prefix)
    Protected,
    /// Matches neither list
    Open,
}

/// Outcome of the auth gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Request may proceed
    Allow,
    /// Protected path without an Authorization header
    MissingToken,
    /// Authorization header present but not a plausible bearer token
    MalformedToken,
}

/// The auth gate stage
#[derive(Debug, Clone)]
pub struct AuthGate {
    enabled: bool,
    protected_paths: Vec<String>,
    public_paths: Vec<String>,
    min_token_length: usize,
}

impl AuthGate {
    /// Build the gate from the security configuration
    #[must_use]
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            enabled: config.auth_enabled,
            protected_paths: config.protected_paths.clone(),
            public_paths: config.public_paths.clone(),
            min_token_length: config.min_token_length,
        }
    }

    /// Classify a path; public membership takes precedence
    #[must_use]
    pub fn classify(&self, path: &str) -> PathClass {
        if self.public_paths.iter().any(|p| path.starts_with(p.as_str())) {
            return PathClass::Public;
        }
        if self
            .protected_paths
            .iter()
            .any(|p| path.starts_with(p.as_str()))
        {
            return PathClass::Protected;
        }
        PathClass::Open
    }

    /// Check a request's path and headers
    #[must_use]
    pub fn check(&self, path: &str, headers: &HeaderMap) -> AuthDecision {
        if !self.enabled {
            return AuthDecision::Allow;
        }

        match self.classify(path) {
            PathClass::Public | PathClass::Open => AuthDecision::Allow,
            PathClass::Protected => match bearer_token(headers) {
                None => {
                    debug!(path, "Protected path without Authorization header");
                    AuthDecision::MissingToken
                },
                Some(token) if token.len() >= self.min_token_length => AuthDecision::Allow,
                Some(_) => {
                    debug!(path, "Bearer token failed structural check");
                    AuthDecision::MalformedToken
                },
            },
        }
    }
}

/// Extract the token from a `Bearer` Authorization header
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn gate() -> AuthGate {
        AuthGate {
            enabled: true,
            protected_paths: vec!["/api/users".to_string(), "/api/predictions".to_string()],
            public_paths: vec!["/api/auth".to_string(), "/health".to_string()],
            min_token_length: 16,
        }
    }

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn public_path_never_requires_token() {
        let gate = gate();
        assert_eq!(
            gate.check("/api/auth/register", &HeaderMap::new()),
            AuthDecision::Allow
        );
    }

    #[test]
    fn public_wins_over_protected() {
        let mut gate = gate();
        // The same prefix appears in both lists
        gate.protected_paths.push("/api/auth".to_string());

        assert_eq!(gate.classify("/api/auth/register"), PathClass::Public);
        assert_eq!(
            gate.check("/api/auth/register", &HeaderMap::new()),
            AuthDecision::Allow
        );
    }

    #[test]
    fn protected_path_without_token_is_rejected() {
        assert_eq!(
            gate().check("/api/users", &HeaderMap::new()),
            AuthDecision::MissingToken
        );
    }

    #[test]
    fn protected_path_with_plausible_token_passes() {
        let headers = headers_with_token("a-sufficiently-long-token");
        assert_eq!(gate().check("/api/users", &headers), AuthDecision::Allow);
    }

    #[test]
    fn short_token_is_malformed() {
        let headers = headers_with_token("short");
        assert_eq!(
            gate().check("/api/users", &headers),
            AuthDecision::MalformedToken
        );
    }

    #[test]
    fn non_bearer_scheme_counts_as_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(
            gate().check("/api/users", &headers),
            AuthDecision::MissingToken
        );
    }

    #[test]
    fn unlisted_path_is_open() {
        let gate = gate();
        assert_eq!(gate.classify("/metrics"), PathClass::Open);
        assert_eq!(gate.check("/metrics", &HeaderMap::new()), AuthDecision::Allow);
    }

    #[test]
    fn disabled_gate_allows_everything() {
        let mut gate = gate();
        gate.enabled = false;
        assert_eq!(
            gate.check("/api/users", &HeaderMap::new()),
            AuthDecision::Allow
        );
    }

    #[test]
    fn bearer_token_extraction() {
        assert_eq!(
            bearer_token(&headers_with_token("abc123")),
            Some("abc123")
        );
        assert_eq!(bearer_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
