//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use gocart_core::checkout::PricedProduct;
use gocart_core::{ProductId, StoreId};

/// A product listed by a store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub description: String,
    /// List price shown struck through.
    pub mrp: Decimal,
    /// Selling price.
    pub price: Decimal,
    pub images: Vec<String>,
    pub category: String,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The fields checkout prices from.
    #[must_use]
    pub const fn priced(&self) -> PricedProduct {
        PricedProduct {
            id: self.id,
            store_id: self.store_id,
            price: self.price,
        }
    }
}

/// A validated product ready to insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub mrp: Decimal,
    pub price: Decimal,
    pub images: Vec<String>,
    pub category: String,
}
