//! Rate limiting
//!
//! Fixed-window counters keyed by `(client identity, request path)`. The
//! quota for a path is chosen by the longest configured path prefix that
//! matches, falling back to the global default. Windows are immutable once
//! started: a rejected request neither increments the counter nor moves
//! the reset time.
//!
//! State is an in-memory map and therefore correct only for a
//! single-instance deployment; running multiple instances needs an
//! external, atomically-incrementable counter store. Expired buckets are
//! dropped lazily on access and swept periodically by
//! [`spawn_cleanup_task`].

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use axum::http::{HeaderMap, Request};
use infrastructure::{PathRateLimit, RateLimitQuota};
use tokio::sync::RwLock;
use tracing::debug;

/// Identity headers, in priority order
const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const CDN_CONNECTING_IP: &str = "cf-connecting-ip";

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted; the bucket was incremented
    Allowed,
    /// Bucket exhausted; metadata for the 429 envelope
    Limited {
        limit: u32,
        window_ms: u64,
        reset_unix_ms: u64,
    },
}

/// One fixed-window counter
#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: Instant,
    reset_unix_ms: u64,
}

/// Shared rate limiter state
#[derive(Debug)]
pub struct RateLimiterState {
    buckets: RwLock<HashMap<String, Bucket>>,
    default_quota: RateLimitQuota,
    overrides: Vec<PathRateLimit>,
}

impl RateLimiterState {
    /// Create a new rate limiter
    #[must_use]
    pub fn new(default_quota: RateLimitQuota, overrides: Vec<PathRateLimit>) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            default_quota,
            overrides,
        }
    }

    /// Select the quota for a path: longest matching prefix wins, first
    /// declared wins ties, default when nothing matches
    #[must_use]
    pub fn quota_for(&self, path: &str) -> RateLimitQuota {
        let mut best: Option<&PathRateLimit> = None;
        for rule in &self.overrides {
            if path.starts_with(rule.prefix.as_str()) {
                let longer = best.is_none_or(|b| rule.prefix.len() > b.prefix.len());
                if longer {
                    best = Some(rule);
                }
            }
        }
        best.map_or(self.default_quota, PathRateLimit::quota)
    }

    /// Check and account one request for `(identity, path)`
    pub async fn check(&self, identity: &str, path: &str) -> RateDecision {
        let quota = self.quota_for(path);
        let key = format!("{identity}:{path}");
        let now = Instant::now();

        let mut buckets = self.buckets.write().await;
        if let Some(bucket) = buckets.get_mut(&key) {
            if bucket.reset_at > now {
                if bucket.count >= quota.max_requests {
                    debug!(key = %key, limit = quota.max_requests, "Rate limit exceeded");
                    return RateDecision::Limited {
                        limit: quota.max_requests,
                        window_ms: quota.window_ms,
                        reset_unix_ms: bucket.reset_unix_ms,
                    };
                }
                bucket.count += 1;
                return RateDecision::Allowed;
            }
        }

        // No bucket, or the previous window expired: start a fresh one
        buckets.insert(key, Bucket::fresh(quota.window_ms, now));
        RateDecision::Allowed
    }

    /// Drop buckets whose window has passed
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;
        buckets.retain(|_, bucket| bucket.reset_at > now);
    }

    /// Number of live buckets (expired ones may still be counted until the
    /// next sweep)
    pub async fn bucket_count(&self) -> usize {
        self.buckets.read().await.len()
    }
}

impl Bucket {
    fn fresh(window_ms: u64, now: Instant) -> Self {
        let unix_now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        Self {
            count: 1,
            reset_at: now + Duration::from_millis(window_ms),
            reset_unix_ms: unix_now_ms.saturating_add(window_ms),
        }
    }
}

/// Derive the client identity from proxy headers
///
/// Priority: first entry of `x-forwarded-for`, then `x-real-ip`, then
/// `cf-connecting-ip`, then the literal `"unknown"`.
#[must_use]
pub fn client_identity(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get(FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    for header in [REAL_IP, CDN_CONNECTING_IP] {
        if let Some(value) = headers.get(header).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    "unknown".to_string()
}

/// Derive the client identity from a request
#[must_use]
pub fn request_identity<B>(req: &Request<B>) -> String {
    client_identity(req.headers())
}

/// Spawn a background sweep that drops expired buckets
///
/// Without the sweep the map only sheds a key when that key is touched
/// again, so abandoned clients would accumulate forever.
pub fn spawn_cleanup_task(
    state: Arc<RateLimiterState>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            state.cleanup().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn limiter(max: u32, window_ms: u64) -> RateLimiterState {
        RateLimiterState::new(RateLimitQuota::new(max, window_ms), Vec::new())
    }

    #[tokio::test]
    async fn requests_within_limit_are_allowed() {
        let state = limiter(5, 1000);
        for _ in 0..5 {
            assert_eq!(state.check("1.2.3.4", "/api/x").await, RateDecision::Allowed);
        }
    }

    #[tokio::test]
    async fn sixth_request_in_window_is_limited() {
        let state = limiter(5, 1000);
        for _ in 0..5 {
            state.check("1.2.3.4", "/api/x").await;
        }

        let decision = state.check("1.2.3.4", "/api/x").await;
        let RateDecision::Limited {
            limit,
            window_ms,
            reset_unix_ms,
        } = decision
        else {
            unreachable!("Expected the 6th request to be limited");
        };
        assert_eq!(limit, 5);
        assert_eq!(window_ms, 1000);
        assert!(reset_unix_ms > 0);
    }

    #[tokio::test]
    async fn rejection_does_not_extend_the_window() {
        let state = limiter(1, 1000);
        state.check("1.2.3.4", "/api/x").await;

        let first = state.check("1.2.3.4", "/api/x").await;
        let second = state.check("1.2.3.4", "/api/x").await;
        let (RateDecision::Limited { reset_unix_ms: a, .. }, RateDecision::Limited { reset_unix_ms: b, .. }) =
            (first, second)
        else {
            unreachable!("Expected both requests to be limited");
        };
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn fresh_window_after_expiry() {
        let state = limiter(2, 1000);
        state.check("1.2.3.4", "/api/x").await;
        state.check("1.2.3.4", "/api/x").await;
        assert!(matches!(
            state.check("1.2.3.4", "/api/x").await,
            RateDecision::Limited { .. }
        ));

        // Time travel: age the bucket past its reset
        {
            let mut buckets = state.buckets.write().await;
            let bucket = buckets.values_mut().next().unwrap();
            bucket.reset_at = Instant::now() - Duration::from_millis(1);
        }

        assert_eq!(state.check("1.2.3.4", "/api/x").await, RateDecision::Allowed);
    }

    #[tokio::test]
    async fn identities_do_not_share_buckets() {
        let state = limiter(1, 1000);
        assert_eq!(state.check("1.2.3.4", "/api/x").await, RateDecision::Allowed);
        assert_eq!(state.check("5.6.7.8", "/api/x").await, RateDecision::Allowed);
        assert!(matches!(
            state.check("1.2.3.4", "/api/x").await,
            RateDecision::Limited { .. }
        ));
    }

    #[tokio::test]
    async fn paths_do_not_share_buckets() {
        let state = limiter(1, 1000);
        assert_eq!(state.check("1.2.3.4", "/api/x").await, RateDecision::Allowed);
        assert_eq!(state.check("1.2.3.4", "/api/y").await, RateDecision::Allowed);
    }

    #[test]
    fn longest_matching_prefix_wins() {
        let state = RateLimiterState::new(
            RateLimitQuota::new(100, 900_000),
            vec![
                PathRateLimit::new("/api", 50, 60_000),
                PathRateLimit::new("/api/news/sentiment", 20, 60_000),
                PathRateLimit::new("/api/news", 30, 60_000),
            ],
        );

        assert_eq!(state.quota_for("/api/news/sentiment").max_requests, 20);
        assert_eq!(state.quota_for("/api/news/batch").max_requests, 30);
        assert_eq!(state.quota_for("/api/users").max_requests, 50);
        assert_eq!(state.quota_for("/health").max_requests, 100);
    }

    #[test]
    fn equal_length_prefixes_keep_declaration_order() {
        let state = RateLimiterState::new(
            RateLimitQuota::new(100, 900_000),
            vec![
                PathRateLimit::new("/api/a", 1, 1000),
                PathRateLimit::new("/api/b", 2, 1000),
            ],
        );
        // Only one can match a given path; order matters when prefixes tie
        // on the same path, which requires identical prefixes
        assert_eq!(state.quota_for("/api/a/x").max_requests, 1);
        assert_eq!(state.quota_for("/api/b/x").max_requests, 2);
    }

    #[tokio::test]
    async fn cleanup_drops_expired_buckets_only() {
        let state = limiter(5, 1000);
        state.check("1.2.3.4", "/api/x").await;
        state.check("1.2.3.4", "/api/y").await;
        assert_eq!(state.bucket_count().await, 2);

        {
            let mut buckets = state.buckets.write().await;
            let bucket = buckets.get_mut("1.2.3.4:/api/x").unwrap();
            bucket.reset_at = Instant::now() - Duration::from_millis(1);
        }

        state.cleanup().await;
        assert_eq!(state.bucket_count().await, 1);
    }

    #[test]
    fn identity_prefers_forwarded_for_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert(REAL_IP, HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_identity(&headers), "203.0.113.7");
    }

    #[test]
    fn identity_falls_back_through_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REAL_IP, HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_identity(&headers), "10.0.0.2");

        let mut headers = HeaderMap::new();
        headers.insert(CDN_CONNECTING_IP, HeaderValue::from_static("10.0.0.3"));
        assert_eq!(client_identity(&headers), "10.0.0.3");
    }

    #[test]
    fn identity_defaults_to_unknown() {
        assert_eq!(client_identity(&HeaderMap::new()), "unknown");
    }
}
