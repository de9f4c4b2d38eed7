//! Prediction entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::{SentimentScore, Symbol};

/// Kind of prediction produced by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    /// Sentiment score over a news article or social post
    Sentiment,
    /// Price/direction forecast for an instrument
    Forecast,
}

/// A single prediction produced by the completion model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Unique prediction identifier
    pub id: Uuid,
    /// Kind of prediction
    pub kind: PredictionKind,
    /// Instrument the prediction is about, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
    /// Sentiment score, when the kind carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<SentimentScore>,
    /// Human-readable summary produced by the model
    pub summary: String,
    /// Model identifier that produced this prediction
    pub model: String,
    /// Whether this is a canned fallback (model reply was unusable)
    #[serde(default)]
    pub fallback: bool,
    /// When the prediction was generated
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    /// Create a sentiment prediction
    pub fn sentiment(score: SentimentScore, summary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: PredictionKind::Sentiment,
            symbol: None,
            score: Some(score),
            summary: summary.into(),
            model: model.into(),
            fallback: false,
            created_at: Utc::now(),
        }
    }

    /// Create a forecast prediction for an instrument
    pub fn forecast(symbol: Symbol, summary: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: PredictionKind::Forecast,
            symbol: Some(symbol),
            score: None,
            summary: summary.into(),
            model: model.into(),
            fallback: false,
            created_at: Utc::now(),
        }
    }

    /// Mark this prediction as a canned fallback
    #[must_use]
    pub fn as_fallback(mut self) -> Self {
        self.fallback = true;
        self
    }
}
