//! Request extractors with `{"error": ...}` rejections.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON body extractor whose rejection is an [`AppError::BadRequest`].
///
/// Request types pair this with `#[serde(deny_unknown_fields)]`, so both
/// missing and unexpected fields are refused with a 400.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejection is an [`AppError::BadRequest`].
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
