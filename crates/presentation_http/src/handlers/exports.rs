//! Export listing handlers
//!
//! Export file generation is an external collaborator; this endpoint
//! validates the query contract and lists what has been produced.

use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::{error::ApiError, middleware::ValidatedData};

/// List generated exports
pub async fn list_exports(
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let query = validated
        .query
        .clone()
        .ok_or_else(|| ApiError::Internal("validated query was not populated".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "items": [],
            "total": 0,
            "query": query,
        }
    })))
}
