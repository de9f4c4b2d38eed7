//! CSRF double-submit protection
//!
//! Unsafe methods must present the same token in the `X-CSRF-Token` header
//! and the `csrf_token` cookie (exact, case-sensitive match). Safe methods
//! pass unconditionally, as do requests carrying a well-formed bearer
//! Authorization header: API-token callers are not exposed to browser
//! cross-site request forgery, and that exemption alone is the observed
//! contract regardless of where the call originates.
//!
//! Tokens are issued lazily: a safe-method response gets a fresh token
//! cookie only when the client does not already have one.

use axum::http::{HeaderMap, HeaderValue, Method, header::SET_COOKIE};
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

use super::auth::bearer_token;

/// Header carrying the client-echoed token
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Cookie carrying the issued token
pub const CSRF_COOKIE: &str = "csrf_token";

/// Issued token lifetime in seconds
const TOKEN_MAX_AGE_SECS: u64 = 3600;

/// The CSRF pipeline stage
#[derive(Debug, Clone)]
pub struct CsrfGuard {
    enabled: bool,
    /// Stamp `Secure` on issued cookies (production deployments)
    secure_cookies: bool,
}

impl CsrfGuard {
    /// Create the guard
    #[must_use]
    pub const fn new(enabled: bool, secure_cookies: bool) -> Self {
        Self {
            enabled,
            secure_cookies,
        }
    }

    /// Validate a request; `true` means it may proceed
    #[must_use]
    pub fn validate(&self, method: &Method, headers: &HeaderMap) -> bool {
        if !self.enabled || is_safe_method(method) {
            return true;
        }

        // Bearer callers are exempt from browser-CSRF concerns
        if bearer_token(headers).is_some() {
            return true;
        }

        let header_token = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());
        let cookie_token = cookie_value(headers, CSRF_COOKIE);

        match (header_token, cookie_token) {
            (Some(header), Some(cookie)) if !header.is_empty() && header == cookie => true,
            _ => {
                debug!(method = %method, "CSRF double-submit mismatch");
                false
            },
        }
    }

    /// Lazily stamp a fresh token cookie on a safe-method response
    ///
    /// No-op when the guard is disabled, the method is unsafe, or the
    /// client already holds a token cookie.
    pub fn issue_token(
        &self,
        method: &Method,
        request_headers: &HeaderMap,
        response: &mut Response,
    ) {
        if !self.enabled || !is_safe_method(method) {
            return;
        }
        if cookie_value(request_headers, CSRF_COOKIE).is_some() {
            return;
        }

        let token = Uuid::new_v4().simple().to_string();
        let secure = if self.secure_cookies { "; Secure" } else { "" };
        let cookie = format!(
            "{CSRF_COOKIE}={token}; Max-Age={TOKEN_MAX_AGE_SECS}; Path=/; HttpOnly; \
             SameSite=Strict{secure}"
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
}

/// Methods that cannot mutate state and never need a token
fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Read a single cookie value from the `Cookie` header
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in cookie_header.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some(name) {
            return parts.next().map(ToString::to_string);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::header::AUTHORIZATION};

    use super::*;

    fn guard() -> CsrfGuard {
        CsrfGuard::new(true, false)
    }

    fn double_submit_headers(header_token: &str, cookie_token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CSRF_HEADER,
            HeaderValue::from_str(header_token).unwrap(),
        );
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_str(&format!("{CSRF_COOKIE}={cookie_token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn safe_methods_always_pass() {
        let guard = guard();
        for method in [Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE] {
            assert!(guard.validate(&method, &HeaderMap::new()));
        }
    }

    #[test]
    fn post_without_tokens_fails() {
        assert!(!guard().validate(&Method::POST, &HeaderMap::new()));
    }

    #[test]
    fn matching_tokens_pass() {
        let headers = double_submit_headers("tok-1", "tok-1");
        assert!(guard().validate(&Method::POST, &headers));
    }

    #[test]
    fn mismatched_tokens_fail() {
        let headers = double_submit_headers("tok-1", "tok-2");
        assert!(!guard().validate(&Method::POST, &headers));
    }

    #[test]
    fn token_comparison_is_case_sensitive() {
        let headers = double_submit_headers("Tok-1", "tok-1");
        assert!(!guard().validate(&Method::POST, &headers));
    }

    #[test]
    fn empty_tokens_fail() {
        let headers = double_submit_headers("", "");
        assert!(!guard().validate(&Method::POST, &headers));
    }

    #[test]
    fn bearer_header_exempts_unsafe_methods() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_static("Bearer some-api-token"),
        );
        assert!(guard().validate(&Method::POST, &headers));
        assert!(guard().validate(&Method::DELETE, &headers));
    }

    #[test]
    fn disabled_guard_passes_everything() {
        let guard = CsrfGuard::new(false, false);
        assert!(guard.validate(&Method::POST, &HeaderMap::new()));
    }

    #[test]
    fn issue_token_sets_cookie_on_safe_method_without_cookie() {
        let mut response = Response::new(Body::empty());
        guard().issue_token(&Method::GET, &HeaderMap::new(), &mut response);

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.starts_with("csrf_token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn issue_token_marks_secure_in_production() {
        let guard = CsrfGuard::new(true, true);
        let mut response = Response::new(Body::empty());
        guard.issue_token(&Method::GET, &HeaderMap::new(), &mut response);

        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.contains("; Secure"));
    }

    #[test]
    fn issue_token_skips_unsafe_methods() {
        let mut response = Response::new(Body::empty());
        guard().issue_token(&Method::POST, &HeaderMap::new(), &mut response);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn issue_token_skips_clients_that_already_hold_one() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("csrf_token=existing"),
        );
        let mut response = Response::new(Body::empty());
        guard().issue_token(&Method::GET, &headers, &mut response);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn cookie_value_parses_multiple_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("a=1; csrf_token=xyz; b=2"),
        );
        assert_eq!(cookie_value(&headers, CSRF_COOKIE), Some("xyz".to_string()));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }
}
