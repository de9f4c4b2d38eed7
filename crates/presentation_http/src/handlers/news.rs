//! News sentiment handlers

use application::ArticleInput;
use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::{error::ApiError, middleware::ValidatedData, state::AppState};

/// Sentiment payload, already validated against `news.analyzeSentiment`
#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub content: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[allow(dead_code)]
    pub source: Option<String>,
}

/// Batch payload, already validated against `news.batchAnalyze`
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub articles: Vec<BatchArticle>,
}

/// One article in a batch
#[derive(Debug, Deserialize)]
pub struct BatchArticle {
    pub title: String,
    pub content: String,
}

/// Score the sentiment of a single piece of content
#[instrument(skip_all)]
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let request: SentimentRequest = validated.body_as()?;

    let prediction = state
        .prediction_service
        .analyze_sentiment(&request.content, &request.content_type)
        .await?;

    Ok(Json(json!({"success": true, "data": prediction})))
}

/// Score a batch of articles
#[instrument(skip_all)]
pub async fn batch_analyze(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let request: BatchRequest = validated.body_as()?;

    let articles: Vec<ArticleInput> = request
        .articles
        .into_iter()
        .map(|a| ArticleInput {
            title: a.title,
            content: a.content,
        })
        .collect();

    let predictions = state.prediction_service.analyze_batch(&articles).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "count": predictions.len(),
            "predictions": predictions,
        }
    })))
}
