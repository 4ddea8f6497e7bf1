//! Stripe payment gateway adapter.
//!
//! Card payments use Stripe hosted checkout: we open a session for the
//! combined amount of a checkout and learn the outcome from signed webhooks.

mod client;
mod error;
mod types;
pub mod webhook;

pub use client::StripeClient;
pub use error::StripeError;
pub use types::{CheckoutSession, CheckoutSessionRequest, Event, EventData, SessionMetadata, SessionObject};

/// Event sent when a customer completes payment.
pub const SESSION_COMPLETED: &str = "checkout.session.completed";

/// Event sent when a session lapses unpaid.
pub const SESSION_EXPIRED: &str = "checkout.session.expired";

/// The hosted-checkout calls a checkout makes.
///
/// [`StripeClient`] is the production gateway.
pub trait PaymentGateway: Sync {
    /// Open a hosted checkout session.
    fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest<'_>,
    ) -> impl Future<Output = Result<CheckoutSession, StripeError>> + Send;

    /// Close an open session so it can no longer be paid.
    fn expire_checkout_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<(), StripeError>> + Send;
}
