//! Coupon repository.

use sqlx::PgPool;

use gocart_core::CouponCode;
use gocart_core::checkout::Coupon;

use super::{RepositoryError, conflict_on_unique};

const COUPON_COLUMNS: &str =
    "code, description, discount, is_public, for_new_user, for_member, expires_at, created_at";

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a coupon by its normalized code, expired or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, code: &CouponCode) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupon WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;
        Ok(coupon)
    }

    /// List all coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupon ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(coupons)
    }

    /// Create a coupon. `created_at` on the argument is ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, coupon: &Coupon) -> Result<Coupon, RepositoryError> {
        let created = sqlx::query_as::<_, Coupon>(&format!(
            r"
            INSERT INTO coupon (code, description, discount, is_public, for_new_user, for_member, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COUPON_COLUMNS}
            "
        ))
        .bind(&coupon.code)
        .bind(&coupon.description)
        .bind(coupon.discount)
        .bind(coupon.is_public)
        .bind(coupon.for_new_user)
        .bind(coupon.for_member)
        .bind(coupon.expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_unique("Coupon code already exists"))?;
        Ok(created)
    }

    /// Delete a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no coupon has this code.
    pub async fn delete(&self, code: &CouponCode) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM coupon WHERE code = $1")
            .bind(code)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("Coupon not found".to_owned()));
        }
        Ok(())
    }
}
