//! Security response headers
//!
//! A fixed set of hardening headers stamped on every response the pipeline
//! forwards. The set does not vary per request; only the enable flag in
//! [`SecurityConfig`](infrastructure::SecurityConfig) controls it.

use std::sync::LazyLock;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// The complete header set, built once
static SECURITY_HEADERS: LazyLock<Vec<(HeaderName, HeaderValue)>> = LazyLock::new(|| {
    vec![
        (
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ),
        (
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ),
        (
            HeaderName::from_static("x-xss-protection"),
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ),
        (
            HeaderName::from_static("strict-transport-security"),
            HeaderValue::from_static("max-age=31536000; includeSubDomains; preload"),
        ),
        (
            HeaderName::from_static("content-security-policy"),
            HeaderValue::from_static(
                "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'; \
                 base-uri 'self'; form-action 'self'",
            ),
        ),
    ]
});

/// Stamp the hardening headers onto a response header map
///
/// Existing values for the same names are replaced; the pipeline is the
/// authority on these headers.
pub fn apply(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS.iter() {
        headers.insert(name.clone(), value.clone());
    }
}

/// The header names this module stamps, for assertions and docs
#[must_use]
pub fn header_names() -> Vec<&'static str> {
    SECURITY_HEADERS.iter().map(|(n, _)| n.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_seven_headers_are_stamped() {
        let mut headers = HeaderMap::new();
        apply(&mut headers);

        assert_eq!(headers.len(), 7);
        assert_eq!(
            headers.get("x-content-type-options").unwrap(),
            &HeaderValue::from_static("nosniff")
        );
        assert_eq!(
            headers.get("x-frame-options").unwrap(),
            &HeaderValue::from_static("DENY")
        );
        assert_eq!(
            headers.get("x-xss-protection").unwrap(),
            &HeaderValue::from_static("1; mode=block")
        );
        assert_eq!(
            headers.get("referrer-policy").unwrap(),
            &HeaderValue::from_static("strict-origin-when-cross-origin")
        );
        assert_eq!(
            headers.get("permissions-policy").unwrap(),
            &HeaderValue::from_static("camera=(), microphone=(), geolocation=()")
        );
        assert_eq!(
            headers.get("strict-transport-security").unwrap(),
            &HeaderValue::from_static("max-age=31536000; includeSubDomains; preload")
        );
    }

    #[test]
    fn csp_is_multi_directive() {
        let mut headers = HeaderMap::new();
        apply(&mut headers);

        let csp = headers
            .get("content-security-policy")
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(csp.contains("default-src 'self'"));
        assert!(csp.contains("frame-ancestors 'none'"));
        assert!(csp.split(';').count() >= 5);
    }

    #[test]
    fn apply_overrides_existing_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("SAMEORIGIN"),
        );
        apply(&mut headers);
        assert_eq!(
            headers.get("x-frame-options").unwrap(),
            &HeaderValue::from_static("DENY")
        );
    }

    #[test]
    fn header_names_lists_the_set() {
        let names = header_names();
        assert_eq!(names.len(), 7);
        assert!(names.contains(&"content-security-policy"));
    }
}
