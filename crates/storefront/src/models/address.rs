//! Shipping addresses.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gocart_core::{AddressId, Email, UserId};

/// A saved shipping address.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// A validated address ready to insert.
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub name: String,
    pub email: Email,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}
