//! Seller stores.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gocart_core::{Email, StoreId, StoreStatus, UserId};

use super::User;

/// A seller's store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub user_id: UserId,
    pub name: String,
    pub description: String,
    pub username: String,
    pub address: String,
    pub status: StoreStatus,
    pub is_active: bool,
    pub logo: String,
    pub email: Email,
    pub contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// Whether the store may sell: approved by an admin and switched on.
    #[must_use]
    pub fn is_selling(&self) -> bool {
        self.status == StoreStatus::Approved && self.is_active
    }
}

/// A store together with its owner, for admin review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreWithOwner {
    #[serde(flatten)]
    pub store: Store,
    pub user: Option<User>,
}

/// A validated store application ready to insert.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub username: String,
    pub description: String,
    pub email: Email,
    pub contact: String,
    pub address: String,
    pub logo: String,
}
