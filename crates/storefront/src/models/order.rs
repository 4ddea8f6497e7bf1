//! Orders and order items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::Json;

use gocart_core::checkout::CouponSnapshot;
use gocart_core::{AddressId, OrderId, OrderStatus, PaymentMethod, ProductId, StoreId, UserId};

use super::{Address, Product};

/// An order placed with a single store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub address_id: AddressId,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub is_paid: bool,
    pub is_coupon_used: bool,
    /// The coupon as it was at checkout.
    pub coupon: Option<Json<CouponSnapshot>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order. `price` is the unit price at checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
    pub discount_percent: Decimal,
}

/// An order item with its product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetails {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Option<Product>,
}

/// An order with its items and shipping address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItemDetails>,
    pub address: Option<Address>,
}
