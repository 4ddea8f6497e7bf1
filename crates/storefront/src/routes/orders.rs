//! Order placement and history.

use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use gocart_core::checkout::{LineItemRequest, MAX_LINE_QUANTITY};
use gocart_core::{AddressId, CouponCode, PaymentMethod, ProductId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::OrderDetails;
use crate::services::checkout::{self, CheckoutOutcome, CheckoutRequest};
use crate::state::AppState;

/// One requested line item.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderItemBody {
    pub id: ProductId,
    pub quantity: u32,
}

/// A coupon as echoed back by the client after verification. Only the code
/// is read; the discount is always looked up again.
#[derive(Debug, Deserialize)]
pub struct CouponRef {
    pub code: String,
}

/// `POST /api/orders` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub address_id: AddressId,
    pub items: Vec<OrderItemBody>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub coupon: Option<CouponRef>,
}

impl PlaceOrderBody {
    /// Validate into a checkout request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an empty item list, a quantity
    /// outside `1..=MAX_LINE_QUANTITY` (after merging repeated products), or
    /// a malformed coupon code.
    pub fn into_request(self) -> Result<CheckoutRequest> {
        if self.items.is_empty() {
            return Err(AppError::BadRequest("missing order details".to_string()));
        }
        if self.items.iter().any(|item| item.quantity == 0) {
            return Err(AppError::BadRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        let mut per_product: HashMap<ProductId, u64> = HashMap::new();
        for item in &self.items {
            *per_product.entry(item.id).or_default() += u64::from(item.quantity);
        }
        if per_product
            .values()
            .any(|&total| total > u64::from(MAX_LINE_QUANTITY))
        {
            return Err(AppError::BadRequest(format!(
                "quantity must be at most {MAX_LINE_QUANTITY}"
            )));
        }

        let raw_code = self
            .coupon_code
            .or_else(|| self.coupon.map(|c| c.code))
            .filter(|code| !code.trim().is_empty());
        let coupon_code = raw_code
            .as_deref()
            .map(CouponCode::parse)
            .transpose()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(CheckoutRequest {
            address_id: self.address_id,
            items: self
                .items
                .into_iter()
                .map(|item| LineItemRequest {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
            payment_method: self.payment_method,
            coupon_code,
        })
    }
}

/// Place orders for every store in the request.
///
/// Cash on delivery answers 201 with a confirmation; card payment answers
/// 200 with the hosted checkout URL.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    ApiJson(body): ApiJson<PlaceOrderBody>,
) -> Result<Response> {
    let request = body.into_request()?;

    let response = match checkout::place_order(&state, &identity, request).await? {
        CheckoutOutcome::Placed { .. } => (
            StatusCode::CREATED,
            Json(json!({ "message": "Orders Placed Successfully" })),
        )
            .into_response(),
        CheckoutOutcome::Redirect { url, .. } => Json(json!({ "url": url })).into_response(),
    };
    Ok(response)
}

/// The caller's visible orders, newest first.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Vec<OrderDetails>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(&identity.user_id)
        .await?;
    Ok(Json(orders))
}
