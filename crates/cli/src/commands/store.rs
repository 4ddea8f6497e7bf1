//! Store review commands.
//!
//! # Usage
//!
//! ```bash
//! gocart store approve 6f1c2a0e-8d3b-4c5a-9e7f-1a2b3c4d5e6f
//! gocart store reject 6f1c2a0e-8d3b-4c5a-9e7f-1a2b3c4d5e6f
//! ```

use gocart_core::{StoreId, StoreStatus};
use gocart_storefront::db::StoreRepository;

use super::{CommandError, connect};

/// Set a store's review status. Approval also activates the store.
///
/// # Errors
///
/// Returns `CommandError` if the id is malformed or the store is unknown.
pub async fn set_status(store_id: &str, status: StoreStatus) -> Result<(), CommandError> {
    let id: StoreId = store_id
        .parse()
        .map_err(|e| CommandError::InvalidArgument(format!("store id: {e}")))?;
    let pool = connect().await?;

    let store = StoreRepository::new(&pool).set_status(id, status).await?;
    tracing::info!(
        store_id = %store.id,
        username = %store.username,
        status = %store.status,
        active = store.is_active,
        "Store status updated"
    );
    Ok(())
}
