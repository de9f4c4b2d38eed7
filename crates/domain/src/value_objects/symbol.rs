//! Instrument symbol value object

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum symbol length accepted by the exchanges we model
const MAX_SYMBOL_LEN: usize = 20;

/// An NSE/BSE-style instrument ticker
///
/// Symbols are stored uppercase. Alphanumeric characters plus `-` and `&`
/// are accepted ("RELIANCE", "BAJAJ-AUTO", "M&M").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker symbol
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_SYMBOL_LEN {
            return Err(DomainError::InvalidSymbol(raw.to_string()));
        }
        let valid = trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '&');
        if !valid {
            return Err(DomainError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// The normalized ticker string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
