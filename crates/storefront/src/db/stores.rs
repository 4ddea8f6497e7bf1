//! Store repository.
//!
//! A user owns at most one store. New stores start pending and inactive until
//! an admin approves them.

use std::collections::HashMap;

use sqlx::PgPool;

use gocart_core::{StoreId, StoreStatus, UserId};

use super::{RepositoryError, UserRepository, conflict_on_unique};
use crate::models::{NewStore, Store, StoreWithOwner};

const STORE_COLUMNS: &str = "id, user_id, name, description, username, address, status, \
                             is_active, logo, email, contact, created_at, updated_at";

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The store owned by `user_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM store WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(store)
    }

    /// Whether a store already uses `username` (expected lower-case).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn username_taken(&self, username: &str) -> Result<bool, RepositoryError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM store WHERE username = $1)")
                .bind(username)
                .fetch_one(self.pool)
                .await?;
        Ok(taken)
    }

    /// Submit a store application. The store starts pending and inactive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or owner is
    /// already taken, or `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, user_id: &UserId, store: &NewStore) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(&format!(
            r"
            INSERT INTO store (id, user_id, name, description, username, address, logo, email, contact)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(StoreId::generate())
        .bind(user_id)
        .bind(&store.name)
        .bind(&store.description)
        .bind(&store.username)
        .bind(&store.address)
        .bind(&store.logo)
        .bind(&store.email)
        .bind(&store.contact)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("username already taken"))
    }

    /// Stores awaiting review or previously rejected, with their owners.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_unapproved(&self) -> Result<Vec<StoreWithOwner>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(&format!(
            r"
            SELECT {STORE_COLUMNS}
            FROM store
            WHERE status IN ('pending', 'rejected')
            ORDER BY created_at
            "
        ))
        .fetch_all(self.pool)
        .await?;

        let owner_ids: Vec<UserId> = stores.iter().map(|s| s.user_id.clone()).collect();
        let mut owners: HashMap<UserId, _> = UserRepository::new(self.pool)
            .find_many(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(stores
            .into_iter()
            .map(|store| StoreWithOwner {
                user: owners.remove(&store.user_id),
                store,
            })
            .collect())
    }

    /// Approve or reject a store. Approval activates it; rejection
    /// deactivates it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such store exists, or
    /// `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: StoreId,
        status: StoreStatus,
    ) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(&format!(
            r"
            UPDATE store
            SET status = $2, is_active = ($2 = 'approved'::store_status), updated_at = now()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Store not found".to_owned()))
    }

    /// Flip a store's active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such store exists, or
    /// `RepositoryError::Database` if the update fails.
    pub async fn toggle_active(&self, id: StoreId) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(&format!(
            r"
            UPDATE store
            SET is_active = NOT is_active, updated_at = now()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Store not found".to_owned()))
    }
}
