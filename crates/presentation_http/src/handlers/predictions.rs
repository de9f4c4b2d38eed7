//! Forecast handlers

use axum::{Extension, Json, extract::State};
use domain::Symbol;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::{
    error::ApiError, middleware::ValidatedData, schema::FieldError, state::AppState,
};

/// Path parameters, already validated against `prediction.params`
#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub symbol: String,
}

/// Query parameters, already validated against `prediction.query`
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub horizon: u16,
}

/// Forecast an instrument's direction
#[instrument(skip_all)]
pub async fn forecast(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let params: ForecastParams = validated.params_as()?;
    let query: ForecastQuery = validated.query_as()?;

    let symbol = Symbol::parse(&params.symbol).map_err(|e| {
        ApiError::Validation(vec![FieldError {
            path: "symbol".to_string(),
            message: e.to_string(),
        }])
    })?;

    let prediction = state
        .prediction_service
        .forecast(&symbol, query.horizon)
        .await?;

    Ok(Json(json!({"success": true, "data": prediction})))
}
