//! Rating repository.

use sqlx::PgPool;

use gocart_core::{RatingId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::{NewRating, Rating};

const RATING_COLUMNS: &str =
    "id, user_id, product_id, order_id, rating, review, created_at, updated_at";

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a rating. Each (user, product, order) may be rated once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product was already rated
    /// for this order, or `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: &UserId,
        rating: &NewRating,
    ) -> Result<Rating, RepositoryError> {
        sqlx::query_as::<_, Rating>(&format!(
            r"
            INSERT INTO rating (id, user_id, product_id, order_id, rating, review)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RATING_COLUMNS}
            "
        ))
        .bind(RatingId::generate())
        .bind(user_id)
        .bind(rating.product_id)
        .bind(rating.order_id)
        .bind(rating.rating)
        .bind(&rating.review)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("Product already rated"))
    }

    /// All ratings the user has given, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Rating>, RepositoryError> {
        let ratings = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM rating WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ratings)
    }
}
