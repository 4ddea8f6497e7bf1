//! Payment gateway error types.

use thiserror::Error;

/// Errors from the Stripe client and webhook verification.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Webhook signature missing, malformed, stale or wrong.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Webhook payload could not be understood.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}
