//! FinSight HTTP presentation layer
//!
//! This crate provides the HTTP API for FinSight: the schema-driven request
//! validation layer, the security middleware pipeline (rate limiting, auth
//! gate, CSRF, security headers), and the route handlers in front of the
//! prediction services.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod schema;
pub mod state;

pub use error::ApiError;
pub use middleware::{
    RateLimiterState, SecurityPipelineLayer, ValidatedData, ValidationLayer, spawn_cleanup_task,
};
pub use routes::{create_app, create_router};
pub use schema::{FieldError, Schema};
pub use state::AppState;
