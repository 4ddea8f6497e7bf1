//! Marketplace user mirror.

use chrono::{DateTime, Utc};
use serde::Serialize;

use gocart_core::UserId;

/// Local copy of an identity-provider user.
///
/// Rows are upserted from the verified identity whenever a user writes data,
/// so orders, stores and addresses always have an owner row to reference.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
