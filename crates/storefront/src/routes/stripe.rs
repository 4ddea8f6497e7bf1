//! Stripe webhook receiver.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{instrument, warn};

use crate::error::{AppError, Result};
use crate::services::payments;
use crate::state::AppState;
use crate::stripe::StripeError;

/// Header carrying the webhook signature.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Receive a payment webhook.
///
/// The raw body is needed for signature verification, so it is taken as
/// bytes rather than JSON.
#[instrument(skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("missing Stripe-Signature header".to_string()))?;

    let event = state
        .stripe()
        .construct_event(&body, signature, Utc::now().timestamp())
        .map_err(|e| {
            warn!(error = %e, "Rejected webhook");
            match e {
                StripeError::InvalidSignature(_) => {
                    AppError::BadRequest("invalid signature".to_string())
                }
                other => AppError::BadRequest(other.to_string()),
            }
        })?;

    payments::apply_event(&state, &event).await?;
    Ok(Json(json!({ "received": true })))
}
