//! Prediction service - prompt templating over the completion port
//!
//! Each operation builds a prompt, sends it through [`CompletionPort`],
//! and parses the reply as JSON. Replies that cannot be parsed degrade to
//! a canned neutral prediction rather than failing the request; the parse
//! failure is logged for operator diagnosis.

use std::sync::Arc;

use domain::{Prediction, SentimentScore, Symbol};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{CompletionPort, CompletionRequest},
};

/// System instruction shared by all prediction prompts
const ANALYST_SYSTEM_PROMPT: &str = "You are a financial analyst covering Indian equity, \
     commodity and FX markets. Reply with a single JSON object and nothing else.";

/// One article in a batch sentiment request
#[derive(Debug, Clone)]
pub struct ArticleInput {
    /// Article headline
    pub title: String,
    /// Article body
    pub content: String,
}

/// Shape the model is prompted to produce for sentiment calls
#[derive(Debug, Deserialize)]
struct SentimentReply {
    score: f64,
    summary: String,
}

/// Shape the model is prompted to produce for forecast calls
#[derive(Debug, Deserialize)]
struct ForecastReply {
    direction: String,
    confidence: f64,
    summary: String,
}

/// Service producing market predictions via the completion model
pub struct PredictionService {
    completion: Arc<dyn CompletionPort>,
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("model", &self.completion.model_name())
            .finish()
    }
}

impl PredictionService {
    /// Create a new prediction service over the given completion port
    #[must_use]
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Score the sentiment of a single piece of content
    #[instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn analyze_sentiment(
        &self,
        content: &str,
        source_type: &str,
    ) -> Result<Prediction, ApplicationError> {
        let prompt = format!(
            "Score the market sentiment of the following {source_type} content for Indian \
             markets. Respond with {{\"score\": <float -1.0..1.0>, \"summary\": \"<one \
             sentence>\"}}.\n\nContent:\n{content}"
        );

        let reply = self
            .completion
            .complete(CompletionRequest::with_system(ANALYST_SYSTEM_PROMPT, prompt))
            .await?;

        let prediction = match parse_reply::<SentimentReply>(&reply.content) {
            Some(parsed) => Prediction::sentiment(
                SentimentScore::new(parsed.score),
                parsed.summary,
                reply.model,
            ),
            None => {
                warn!(model = %reply.model, "Unparseable sentiment reply, using neutral fallback");
                Prediction::sentiment(
                    SentimentScore::default(),
                    "Sentiment unavailable; neutral stance assumed",
                    reply.model,
                )
                .as_fallback()
            },
        };

        Ok(prediction)
    }

    /// Score a batch of articles, one prediction per article
    ///
    /// Articles are scored sequentially; a failed completion call fails the
    /// whole batch (the caller already validated the batch is non-empty).
    #[instrument(skip(self, articles), fields(batch_len = articles.len()))]
    pub async fn analyze_batch(
        &self,
        articles: &[ArticleInput],
    ) -> Result<Vec<Prediction>, ApplicationError> {
        let mut predictions = Vec::with_capacity(articles.len());
        for article in articles {
            let combined = format!("{}\n\n{}", article.title, article.content);
            predictions.push(self.analyze_sentiment(&combined, "news").await?);
        }
        Ok(predictions)
    }

    /// Produce a directional forecast for an instrument
    #[instrument(skip(self), fields(symbol = %symbol, horizon_days))]
    pub async fn forecast(
        &self,
        symbol: &Symbol,
        horizon_days: u16,
    ) -> Result<Prediction, ApplicationError> {
        let prompt = format!(
            "Forecast the direction of {symbol} on the NSE over the next {horizon_days} trading \
             days. Respond with {{\"direction\": \"up\"|\"down\"|\"sideways\", \"confidence\": \
             <float 0.0..1.0>, \"summary\": \"<one sentence>\"}}."
        );

        let reply = self
            .completion
            .complete(CompletionRequest::with_system(ANALYST_SYSTEM_PROMPT, prompt))
            .await?;

        let prediction = match parse_reply::<ForecastReply>(&reply.content) {
            Some(parsed) => {
                let summary = format!(
                    "{} (direction: {}, confidence: {:.2})",
                    parsed.summary,
                    parsed.direction,
                    parsed.confidence.clamp(0.0, 1.0)
                );
                Prediction::forecast(symbol.clone(), summary, reply.model)
            },
            None => {
                warn!(model = %reply.model, %symbol, "Unparseable forecast reply, using fallback");
                Prediction::forecast(
                    symbol.clone(),
                    "Forecast unavailable; no directional signal",
                    reply.model,
                )
                .as_fallback()
            },
        };

        Ok(prediction)
    }

    /// Check whether the completion backend is reachable
    pub async fn is_healthy(&self) -> bool {
        self.completion.is_healthy().await
    }
}

/// Extract a typed JSON object from a model reply
///
/// Models occasionally wrap the object in prose or code fences; retry on the
/// substring between the first `{` and the last `}` before giving up.
fn parse_reply<T: serde::de::DeserializeOwned>(content: &str) -> Option<T> {
    let trimmed = content.trim();
    if let Ok(parsed) = serde_json::from_str(trimmed) {
        return Some(parsed);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}
