//! Log query handlers
//!
//! Log storage lives with the observability stack; this endpoint validates
//! and normalizes the query contract and answers from what the process can
//! see (currently nothing), keeping the API shape stable for clients.

use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::{error::ApiError, middleware::ValidatedData};

/// Query application logs
pub async fn query_logs(
    Extension(validated): Extension<ValidatedData>,
) -> Result<Json<Value>, ApiError> {
    let filters = validated
        .query
        .clone()
        .ok_or_else(|| ApiError::Internal("validated query was not populated".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "items": [],
            "total": 0,
            "filters": filters,
        }
    })))
}
