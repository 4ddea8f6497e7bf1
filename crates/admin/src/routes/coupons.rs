//! Coupon management for administrators.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use gocart_core::checkout::Coupon;
use gocart_core::{CouponCode, validate_percentage};
use gocart_storefront::db::CouponRepository;

use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Coupon fields as sent by the back-office client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CouponInput {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount: Decimal,
    #[serde(default)]
    pub for_new_user: bool,
    #[serde(default)]
    pub for_member: bool,
    #[serde(default)]
    pub is_public: bool,
    pub expires_at: DateTime<Utc>,
}

/// `POST /api/admin/coupon` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCouponBody {
    pub coupon: CouponInput,
}

/// `DELETE /api/admin/coupon` query.
#[derive(Debug, Deserialize)]
pub struct DeleteCouponQuery {
    pub code: String,
}

impl CouponInput {
    /// Validate against the clock `now`.
    fn into_coupon(self, now: DateTime<Utc>) -> Result<Coupon> {
        let code = CouponCode::parse(&self.code).map_err(|e| AppError::BadRequest(e.to_string()))?;
        let discount =
            validate_percentage(self.discount).map_err(|e| AppError::BadRequest(e.to_string()))?;
        if self.expires_at <= now {
            return Err(AppError::BadRequest(
                "expiresAt must be in the future".to_string(),
            ));
        }

        Ok(Coupon {
            code,
            description: self.description.trim().to_owned(),
            discount,
            is_public: self.is_public,
            for_new_user: self.for_new_user,
            for_member: self.for_member,
            expires_at: self.expires_at,
            created_at: now,
        })
    }
}

/// All coupons, newest first.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Value>> {
    let coupons = CouponRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "coupons": coupons })))
}

/// Create a coupon. Codes are stored upper-case; duplicates are a 409.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateCouponBody>,
) -> Result<Json<Value>> {
    let coupon = body.coupon.into_coupon(Utc::now())?;
    let created = CouponRepository::new(state.pool()).create(&coupon).await?;

    info!(code = %created.code, discount = %created.discount, "Coupon created");
    Ok(Json(json!({
        "message": "Coupon created successfully",
        "coupon": created,
    })))
}

/// Delete a coupon by code.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<DeleteCouponQuery>,
) -> Result<Json<Value>> {
    let code = CouponCode::parse(&query.code).map_err(|e| AppError::BadRequest(e.to_string()))?;
    CouponRepository::new(state.pool()).delete(&code).await?;

    info!(%code, "Coupon deleted");
    Ok(Json(json!({ "message": "Coupon deleted successfully" })))
}
