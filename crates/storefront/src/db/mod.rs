//! Database operations for the marketplace `PostgreSQL` database.
//!
//! # Tables
//!
//! - `app_user` - Mirror of identity-provider users
//! - `cart` - Versioned per-user carts
//! - `store` - Seller stores and their approval status
//! - `product` - Store catalogs
//! - `address` - Customer shipping addresses
//! - `coupon` - Discount coupons
//! - `orders` / `order_item` - Placed orders with price snapshots
//! - `rating` - Product ratings
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p gocart-cli -- migrate
//! ```
//!
//! # Transactions
//!
//! Repositories hold a pool reference for standalone queries. Writes that must
//! commit together (checkout, payment confirmation) are associated functions
//! taking `&mut PgConnection`, so callers can pass `&mut *tx`.

pub mod addresses;
pub mod carts;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod stores;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use coupons::CouponRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use ratings::RatingRepository;
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("{0}")]
    NotFound(String),

    /// Constraint violation (e.g., unique username).
    #[error("{0}")]
    Conflict(String),
}

/// Map a unique violation to [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_unique(message: &str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(message.to_owned());
        }
        RepositoryError::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
