//! Store review for administrators.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use gocart_core::{StoreId, StoreStatus};
use gocart_storefront::db::StoreRepository;
use gocart_storefront::middleware::{AuthRejection, OptionalAuth};

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{RequireAdmin, is_admin};
use crate::state::AppState;

/// `POST /api/admin/approve-store` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReviewStoreBody {
    pub store_id: StoreId,
    pub status: String,
}

/// `POST /api/admin/toggle-store` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToggleStoreBody {
    pub store_id: StoreId,
}

/// Only the two final decisions can be set by hand.
fn review_decision(raw: &str) -> Result<StoreStatus> {
    match raw.trim() {
        "approved" => Ok(StoreStatus::Approved),
        "rejected" => Ok(StoreStatus::Rejected),
        _ => Err(AppError::BadRequest("Invalid status value".to_string())),
    }
}

/// Whether the caller is an administrator.
///
/// Always answers 200; anonymous callers and identity-provider outages both
/// read as `false`.
pub async fn is_admin_check(
    State(state): State<AppState>,
    auth: std::result::Result<OptionalAuth, AuthRejection>,
) -> Json<Value> {
    let is_admin = match auth {
        Ok(OptionalAuth(Some(identity))) => is_admin(state.config(), &identity),
        Ok(OptionalAuth(None)) => false,
        Err(rejection) => {
            tracing::warn!(?rejection, "Admin check could not verify caller");
            false
        }
    };
    Json(json!({ "isAdmin": is_admin }))
}

/// Stores waiting for review, or previously rejected, with their owners.
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn list_pending(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Value>> {
    let stores = StoreRepository::new(state.pool()).list_unapproved().await?;
    Ok(Json(json!({ "stores": stores })))
}

/// Approve or reject a store application.
#[instrument(skip_all, fields(admin_id = %admin.user_id, store_id = %body.store_id))]
pub async fn review(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<ReviewStoreBody>,
) -> Result<Json<Value>> {
    let status = review_decision(&body.status)?;
    let store = StoreRepository::new(state.pool())
        .set_status(body.store_id, status)
        .await?;

    info!(username = %store.username, %status, "Store reviewed");
    Ok(Json(json!({ "message": format!("Store {status} successfully") })))
}

/// Switch a store on or off.
#[instrument(skip_all, fields(admin_id = %admin.user_id, store_id = %body.store_id))]
pub async fn toggle(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<ToggleStoreBody>,
) -> Result<Json<Value>> {
    let store = StoreRepository::new(state.pool())
        .toggle_active(body.store_id)
        .await?;

    info!(username = %store.username, active = store.is_active, "Store toggled");
    Ok(Json(json!({
        "message": "Store status updated successfully",
        "isActive": store.is_active,
    })))
}
