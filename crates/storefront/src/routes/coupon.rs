//! Coupon verification.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use gocart_core::CouponCode;
use gocart_core::checkout::{CustomerStanding, evaluate_coupon};

use crate::db::{CouponRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// `POST /api/coupon` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifyCouponBody {
    #[serde(default)]
    pub code: String,
}

/// Check whether the caller may use a coupon, without placing an order.
///
/// Public coupons verify for anonymous callers; all others need sign-in.
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    ApiJson(body): ApiJson<VerifyCouponBody>,
) -> Result<Json<Value>> {
    let code = CouponCode::parse(&body.code).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let coupon = CouponRepository::new(state.pool()).find(&code).await?;

    let standing = match (&identity, &coupon) {
        (Some(identity), Some(coupon)) if !coupon.is_public => Some(CustomerStanding {
            prior_orders: OrderRepository::new(state.pool())
                .count_for_user(&identity.user_id)
                .await?,
            is_member: identity.is_member,
        }),
        _ => None,
    };

    let coupon = evaluate_coupon(coupon.as_ref(), standing.as_ref(), Utc::now())?;
    Ok(Json(json!({ "coupon": coupon })))
}
