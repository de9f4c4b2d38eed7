//! UPI payment handlers
//!
//! The payment service provider integration is an external collaborator;
//! this surface validates the intent and acknowledges it.

use axum::{Extension, Json, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{error::ApiError, middleware::ValidatedData};

/// UPI payload, already validated against `payment.initiateUPI`
#[derive(Debug, Deserialize)]
pub struct UpiRequest {
    pub amount: f64,
    pub vpa: String,
    pub note: Option<String>,
}

/// Initiate a UPI collect request
#[instrument(skip_all)]
pub async fn initiate_upi(
    Extension(validated): Extension<ValidatedData>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request: UpiRequest = validated.body_as()?;

    let payment_id = Uuid::new_v4();
    info!(%payment_id, vpa = %request.vpa, "UPI payment initiated");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "success": true,
            "data": {
                "paymentId": payment_id,
                "status": "initiated",
                "amount": request.amount,
                "vpa": request.vpa,
                "note": request.note,
                "initiatedAt": Utc::now().to_rfc3339(),
            }
        })),
    ))
}
