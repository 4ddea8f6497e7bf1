//! User repository.
//!
//! The identity provider owns users; this table mirrors display fields and
//! anchors foreign keys.

use sqlx::{PgConnection, PgPool};

use gocart_core::UserId;

use super::RepositoryError;
use crate::identity::Identity;
use crate::models::User;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh the mirror row for a verified identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        conn: &mut PgConnection,
        identity: &Identity,
    ) -> Result<(), RepositoryError> {
        let email = identity.email.as_ref().map_or("", |e| e.as_str());
        sqlx::query(
            r"
            INSERT INTO app_user (id, name, email, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                image = EXCLUDED.image,
                updated_at = now()
            ",
        )
        .bind(&identity.user_id)
        .bind(&identity.name)
        .bind(email)
        .bind(&identity.image_url)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Upsert using a pooled connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(&self, identity: &Identity) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::upsert(&mut conn, identity).await
    }

    /// Load users by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, email, image, created_at, updated_at
            FROM app_user
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }
}
