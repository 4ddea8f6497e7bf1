//! Identity provider adapter.
//!
//! Sign-in, token issuance and plan billing live in an external identity
//! service. We only ask it one question per request: "who does this bearer
//! token belong to?" The answer is an [`Identity`], cached briefly per token.

mod client;
mod error;

pub use client::IdentityClient;
pub use error::IdentityError;

use gocart_core::{Email, UserId};

/// A verified caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    /// Primary email, if the provider has a valid one on file.
    pub email: Option<Email>,
    pub name: String,
    pub image_url: String,
    /// Whether the caller holds the member plan.
    pub is_member: bool,
}
