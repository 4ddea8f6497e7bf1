//! Versioned cart endpoints.
//!
//! Clients send back the version they loaded; a stale version gets a 409 and
//! should reload before retrying.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use gocart_core::ProductId;
use gocart_core::checkout::MAX_LINE_QUANTITY;

use crate::db::{CartRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::state::AppState;

/// `POST /api/cart` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceCartBody {
    pub cart: BTreeMap<ProductId, u32>,
    pub version: i64,
}

impl ReplaceCartBody {
    fn validate(&self) -> Result<()> {
        if self.version < 0 {
            return Err(AppError::BadRequest("version must not be negative".to_string()));
        }
        if self.cart.values().any(|&quantity| quantity == 0) {
            return Err(AppError::BadRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        if self.cart.values().any(|&quantity| quantity > MAX_LINE_QUANTITY) {
            return Err(AppError::BadRequest(format!(
                "quantity must be at most {MAX_LINE_QUANTITY}"
            )));
        }
        Ok(())
    }
}

/// The caller's cart.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get(&identity.user_id)
        .await?;
    Ok(Json(cart))
}

/// Replace the cart if the client's version is current.
#[instrument(skip_all, fields(user_id = %identity.user_id, version = body.version))]
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    ApiJson(body): ApiJson<ReplaceCartBody>,
) -> Result<Json<Cart>> {
    body.validate()?;
    UserRepository::new(state.pool()).ensure(&identity).await?;

    let cart = CartRepository::new(state.pool())
        .replace(&identity.user_id, body.cart, body.version)
        .await?;
    Ok(Json(cart))
}

/// Empty the cart.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());
    carts.clear_now(&identity.user_id).await?;
    Ok(Json(carts.get(&identity.user_id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_body_parses() {
        let body: ReplaceCartBody = serde_json::from_str(
            r#"{"cart":{"0b9e4f2a-1c3d-4e5f-8a7b-9c0d1e2f3a4b":3},"version":2}"#,
        )
        .unwrap();
        assert_eq!(body.cart.values().copied().collect::<Vec<_>>(), vec![3]);
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let body: ReplaceCartBody = serde_json::from_str(
            r#"{"cart":{"0b9e4f2a-1c3d-4e5f-8a7b-9c0d1e2f3a4b":0},"version":1}"#,
        )
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_oversized_quantity_rejected() {
        let body: ReplaceCartBody = serde_json::from_str(
            r#"{"cart":{"0b9e4f2a-1c3d-4e5f-8a7b-9c0d1e2f3a4b":4000000000},"version":1}"#,
        )
        .unwrap();
        assert!(matches!(body.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_version_required() {
        assert!(serde_json::from_str::<ReplaceCartBody>(r#"{"cart":{}}"#).is_err());
    }

    #[test]
    fn test_bad_product_key_rejected() {
        assert!(
            serde_json::from_str::<ReplaceCartBody>(r#"{"cart":{"p1":1},"version":0}"#).is_err()
        );
    }

    #[test]
    fn test_empty_cart_serializes_at_version_zero() {
        let json = serde_json::to_value(Cart::default()).unwrap();
        assert_eq!(json, serde_json::json!({ "cart": {}, "version": 0 }));
    }
}
