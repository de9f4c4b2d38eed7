//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid instrument symbol format
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Sentiment score outside the representable range
    #[error("Invalid sentiment score: {0}")]
    InvalidSentimentScore(f64),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Prediction", "abc");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Prediction");
                assert_eq!(id, "abc");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Prediction", "abc");
        assert_eq!(err.to_string(), "Prediction not found: abc");
    }

    #[test]
    fn invalid_symbol_error_message() {
        let err = DomainError::InvalidSymbol("lower case".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: lower case");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("field is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: field is required");
    }
}
