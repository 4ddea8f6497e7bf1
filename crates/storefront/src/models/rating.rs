//! Product ratings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gocart_core::{OrderId, ProductId, RatingId, UserId};

/// A customer's rating of a product they ordered.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub rating: i32,
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated rating ready to insert.
#[derive(Debug, Clone)]
pub struct NewRating {
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub rating: i32,
    pub review: String,
}
