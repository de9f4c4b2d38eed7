//! User listing handlers

use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{error::ApiError, middleware::ValidatedData, state::AppState};

/// Pagination values, already validated and defaulted
#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

/// List registered users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let pagination: Pagination = validated.query_as()?;
    let (items, total) = state
        .user_directory
        .list(pagination.page, pagination.limit)
        .await;

    Ok(Json(json!({
        "success": true,
        "data": {
            "items": items,
            "page": pagination.page,
            "limit": pagination.limit,
            "total": total,
        }
    })))
}
