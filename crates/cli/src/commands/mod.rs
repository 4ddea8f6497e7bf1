//! CLI command implementations.

pub mod coupon;
pub mod migrate;
pub mod store;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use gocart_storefront::db::{RepositoryError, create_pool};

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository operation failed.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Invalid command argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connect to the marketplace database.
///
/// Reads `STOREFRONT_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// # Errors
///
/// Returns `CommandError` if neither variable is set or the pool fails.
pub async fn connect() -> Result<PgPool, CommandError> {
    let _ = dotenvy::dotenv();

    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to marketplace database...");
    Ok(create_pool(&SecretString::from(url)).await?)
}
