//! HTTP middleware components
//!
//! The security pipeline stages (rate limiting, auth gate, CSRF,
//! security headers), the schema validation layer, and request ID
//! correlation.

pub mod auth;
pub mod csrf;
pub mod pipeline;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod validation;

pub use auth::{AuthDecision, AuthGate, PathClass};
pub use csrf::{CSRF_COOKIE, CSRF_HEADER, CsrfGuard};
pub use pipeline::{SecurityPipeline, SecurityPipelineLayer};
pub use rate_limit::{RateDecision, RateLimiterState, client_identity, spawn_cleanup_task};
pub use request_id::{REQUEST_ID_HEADER, RequestId, RequestIdLayer};
pub use validation::{ValidatedData, ValidationLayer, ValidationSpec};
