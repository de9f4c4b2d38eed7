//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Completion model error
    #[error("Completion error: {0}")]
    Completion(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Rate limit exceeded downstream
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Caller not authorized
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ExternalService(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_retryable() {
        assert!(ApplicationError::RateLimited.is_retryable());
    }

    #[test]
    fn external_service_is_retryable() {
        assert!(ApplicationError::ExternalService("down".to_string()).is_retryable());
    }

    #[test]
    fn completion_error_is_not_retryable() {
        assert!(!ApplicationError::Completion("bad reply".to_string()).is_retryable());
    }

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::ValidationError("bad".to_string()).into();
        assert!(matches!(err, ApplicationError::Domain(_)));
    }
}
