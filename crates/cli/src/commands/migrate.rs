//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! build time. Servers never migrate on startup.

use super::{CommandError, connect};

/// Run all pending marketplace migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running marketplace migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
