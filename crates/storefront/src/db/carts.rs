//! Cart repository.
//!
//! Carts use optimistic concurrency: every write names the version it was
//! based on and bumps it. Clearing keeps the row so versions never go back.

use std::collections::BTreeMap;

use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use gocart_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Cart;

type CartItems = BTreeMap<ProductId, u32>;

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the user's cart. Users without a stored cart get an empty one at
    /// version 0.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: &UserId) -> Result<Cart, RepositoryError> {
        let row: Option<(Json<CartItems>, i64)> =
            sqlx::query_as("SELECT items, version FROM cart WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map_or_else(Cart::default, |(Json(items), version)| Cart {
            items,
            version,
        }))
    }

    /// Replace the cart contents if it is still at `expected_version`.
    ///
    /// Returns the cart as stored, with its new version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another write got there first,
    /// or `RepositoryError::Database` if the query fails.
    pub async fn replace(
        &self,
        user_id: &UserId,
        items: CartItems,
        expected_version: i64,
    ) -> Result<Cart, RepositoryError> {
        let version: Option<i64> = if expected_version == 0 {
            sqlx::query_scalar(
                r"
                INSERT INTO cart (user_id, items, version)
                VALUES ($1, $2, 1)
                ON CONFLICT (user_id) DO NOTHING
                RETURNING version
                ",
            )
            .bind(user_id)
            .bind(Json(&items))
            .fetch_optional(self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                r"
                UPDATE cart
                SET items = $3, version = version + 1, updated_at = now()
                WHERE user_id = $1 AND version = $2
                RETURNING version
                ",
            )
            .bind(user_id)
            .bind(expected_version)
            .bind(Json(&items))
            .fetch_optional(self.pool)
            .await?
        };

        let version = version.ok_or_else(|| {
            RepositoryError::Conflict("Cart was updated elsewhere, reload and retry".to_owned())
        })?;
        Ok(Cart { items, version })
    }

    /// Empty the user's cart, bumping its version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn clear(conn: &mut PgConnection, user_id: &UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE cart
            SET items = '{}'::jsonb, version = version + 1, updated_at = now()
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Empty the user's cart using a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn clear_now(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::clear(&mut conn, user_id).await
    }
}
