//! Health and readiness handlers

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::state::AppState;

/// Liveness probe; always succeeds while the process runs
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe; checks the completion backend
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.prediction_service.is_healthy().await {
        (StatusCode::OK, Json(json!({"status": "ready"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "degraded", "reason": "completion backend unreachable"})),
        )
    }
}
