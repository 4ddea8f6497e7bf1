//! Payment confirmation.
//!
//! Card checkouts leave unpaid orders behind until Stripe tells us how the
//! hosted session ended.

use thiserror::Error;
use tracing::{debug, info, instrument};

use gocart_core::UserId;

use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::state::AppState;
use crate::stripe::{Event, SESSION_COMPLETED, SESSION_EXPIRED, StripeError};

/// Errors while applying a webhook event.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// What a webhook event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Orders were marked paid and the cart cleared.
    Paid { orders: u64 },
    /// Unpaid orders of an abandoned session were removed.
    Expired { orders: u64 },
    /// Not an event we act on, or not one of our sessions.
    Ignored,
}

/// Apply a verified webhook event.
///
/// # Errors
///
/// Returns `PaymentError` if the session metadata is malformed or a database
/// write fails.
#[instrument(skip_all, fields(event_id = %event.id, kind = %event.kind))]
pub async fn apply_event(state: &AppState, event: &Event) -> Result<WebhookOutcome, PaymentError> {
    if event.kind != SESSION_COMPLETED && event.kind != SESSION_EXPIRED {
        debug!("Ignoring webhook event");
        return Ok(WebhookOutcome::Ignored);
    }

    let session = event.session()?;
    if session.metadata.app_id != state.stripe().app_id() {
        debug!(app_id = %session.metadata.app_id, "Session belongs to another app");
        return Ok(WebhookOutcome::Ignored);
    }

    let order_ids = session.metadata.order_ids()?;
    let user_id = UserId::new(session.metadata.user_id);

    if event.kind == SESSION_COMPLETED {
        let mut tx = state.pool().begin().await.map_err(RepositoryError::from)?;
        let orders = OrderRepository::mark_paid(&mut tx, &user_id, &order_ids).await?;
        CartRepository::clear(&mut tx, &user_id).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        info!(user_id = %user_id, orders, "Orders paid");
        Ok(WebhookOutcome::Paid { orders })
    } else {
        let orders = OrderRepository::new(state.pool())
            .delete_unpaid(&user_id, &order_ids)
            .await?;

        info!(user_id = %user_id, orders, "Removed orders of expired session");
        Ok(WebhookOutcome::Expired { orders })
    }
}
