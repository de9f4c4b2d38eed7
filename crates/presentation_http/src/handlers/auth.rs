//! Registration handler
//!
//! Credential verification and token issuance belong to the external
//! identity provider; this surface only creates the local account record.

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::{
    error::ApiError, middleware::ValidatedData, schema::FieldError, state::AppState,
};

/// Registration payload, already validated against `user.create`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[allow(dead_code)]
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Register a new user account
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Extension(validated): Extension<ValidatedData>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request: RegisterRequest = validated.body_as()?;

    let user = state
        .user_directory
        .register(request.email, request.full_name, request.phone)
        .await
        .map_err(|_| {
            ApiError::Validation(vec![FieldError {
                path: "email".to_string(),
                message: "is already registered".to_string(),
            }])
        })?;

    info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({"success": true, "data": user})),
    ))
}
