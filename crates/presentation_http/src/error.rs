//! API error handling
//!
//! Every error leaving the API is a machine-parseable JSON envelope with a
//! stable `success: false` discriminator and either a `code` or a `details`
//! array. Internal errors are logged server-side with full context and
//! surfaced as a generic body that leaks nothing.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::error;

use crate::schema::FieldError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request input failed schema validation
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Caller exhausted its rate-limit bucket
    #[error("Rate limit exceeded")]
    RateLimited {
        limit: u32,
        window_ms: u64,
        reset_unix_ms: u64,
    },

    /// Bearer token missing on a protected path
    #[error("Unauthorized")]
    Unauthorized,

    /// Bearer token present but structurally invalid
    #[error("Invalid token")]
    InvalidToken,

    /// CSRF double-submit validation failed
    #[error("CSRF validation failed")]
    CsrfFailed,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Downstream service unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Unexpected internal failure; detail is logged, never returned
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Always `false`
    pub success: bool,
    /// Error message
    pub error: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Structured error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// When the error was produced (validation errors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorEnvelope {
    fn coded(error: &str, code: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            code: Some(code.to_string()),
            details: None,
            timestamp: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(field_errors) => {
                let details: Vec<Value> = field_errors
                    .iter()
                    .map(|e| json!({"path": e.path, "message": e.message}))
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorEnvelope {
                        success: false,
                        error: "Validation failed".to_string(),
                        code: None,
                        details: Some(Value::Array(details)),
                        timestamp: Some(Utc::now().to_rfc3339()),
                    },
                )
            },
            Self::RateLimited {
                limit,
                window_ms,
                reset_unix_ms,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorEnvelope {
                    success: false,
                    error: "Rate limit exceeded".to_string(),
                    code: Some("RATE_LIMIT_EXCEEDED".to_string()),
                    details: Some(json!({
                        "limit": limit,
                        "window": window_ms,
                        "resetTime": reset_unix_ms,
                    })),
                    timestamp: None,
                },
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorEnvelope::coded("Unauthorized", "UNAUTHORIZED"),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorEnvelope::coded("Invalid token", "INVALID_TOKEN"),
            ),
            Self::CsrfFailed => (
                StatusCode::FORBIDDEN,
                ErrorEnvelope::coded("CSRF validation failed", "CSRF_FAILED"),
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorEnvelope::coded(&msg, "NOT_FOUND"),
            ),
            Self::ServiceUnavailable(msg) => {
                error!(detail = %msg, "Downstream service unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorEnvelope::coded("Service temporarily unavailable", "SERVICE_UNAVAILABLE"),
                )
            },
            Self::Internal(msg) => {
                // The detail stays in the logs; the body stays generic.
                error!(detail = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorEnvelope::coded("Internal server error", "INTERNAL_ERROR"),
                )
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::Validation(vec![FieldError {
                path: String::new(),
                message: e.to_string(),
            }]),
            ApplicationError::RateLimited => Self::ServiceUnavailable(
                "completion service rate limit".to_string(),
            ),
            ApplicationError::NotAuthorized(_) => Self::Unauthorized,
            ApplicationError::Completion(msg) | ApplicationError::ExternalService(msg) => {
                Self::ServiceUnavailable(msg)
            },
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}
