//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`,
//! and every failure reaches the client as `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gocart_core::checkout::CouponRejection;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::identity::IdentityError;
use crate::services::checkout::CheckoutError;
use crate::services::payments::PaymentError;
use crate::stripe::StripeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Identity provider call failed.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Payment gateway call failed.
    #[error("Payment error: {0}")]
    Payment(#[from] StripeError),

    /// Coupon may not be used by this caller.
    #[error("Coupon rejected: {0}")]
    Coupon(#[from] CouponRejection),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Identity(_) | Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::Coupon(rejection) => match rejection {
                CouponRejection::NotFound | CouponRejection::Expired => StatusCode::NOT_FOUND,
                CouponRejection::LoginRequired => StatusCode::UNAUTHORIZED,
                CouponRejection::NotEligibleNewUser | CouponRejection::MembersOnly => {
                    StatusCode::BAD_REQUEST
                }
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to clients.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound(msg) | RepositoryError::Conflict(msg)) => {
                msg.clone()
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Identity(_) => "Identity service unavailable".to_string(),
            Self::Payment(_) => "Payment service error".to_string(),
            Self::Coupon(rejection) => rejection.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Repository(e) => Self::Database(e),
            CheckoutError::Payment(e) => Self::Payment(e),
            // During checkout every coupon problem is a bad request.
            CheckoutError::Coupon(rejection) => Self::BadRequest(rejection.to_string()),
            CheckoutError::EmptyCart(e) => Self::BadRequest(e.to_string()),
            CheckoutError::AddressNotFound => Self::NotFound("Address not found".to_string()),
            CheckoutError::Amount(e) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Repository(e) => Self::Database(e),
            // Malformed session metadata is the sender's problem.
            PaymentError::Stripe(e) => Self::BadRequest(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an identity-provider user id.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}
