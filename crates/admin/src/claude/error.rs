//! Claude API failures.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors from a Messages API call.
#[derive(Debug, Error)]
pub enum ClaudeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error body.
    #[error("API error {status} ({error_type}): {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    #[error("rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    /// Anthropic is shedding load (HTTP 529).
    #[error("API overloaded")]
    Overloaded,

    /// The API key was refused.
    #[error("unauthorized")]
    Unauthorized,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ClaudeError {
    /// Whether the call may succeed if the seller simply tries again later.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Overloaded)
    }

    /// Build an error from a non-success status and its body.
    ///
    /// Bodies that are not the documented error envelope are kept verbatim
    /// as the message.
    #[must_use]
    pub fn from_response(status: StatusCode, retry_after: Option<u64>, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => return Self::Unauthorized,
            429 => {
                return Self::RateLimited {
                    retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                };
            }
            529 => return Self::Overloaded,
            _ => {}
        }

        let (error_type, message) = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
            |_| ("unknown".to_string(), body.trim().to_string()),
            |envelope| (envelope.error.kind, envelope.error.message),
        );
        Self::Api {
            status: status.as_u16(),
            error_type,
            message,
        }
    }
}

/// Used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// `{"type": "error", "error": {"type": .., "message": ..}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_body() {
        let err = ClaudeError::from_response(
            StatusCode::BAD_REQUEST,
            None,
            r#"{"type":"error","error":{"type":"invalid_request_error","message":"image exceeds 5 MB maximum"}}"#,
        );
        assert_eq!(
            err.to_string(),
            "API error 400 (invalid_request_error): image exceeds 5 MB maximum"
        );
        assert!(!err.is_busy());
    }

    #[test]
    fn test_plain_error_body() {
        let err = ClaudeError::from_response(
            StatusCode::BAD_GATEWAY,
            None,
            "upstream connect error\n",
        );
        assert!(matches!(
            err,
            ClaudeError::Api { status: 502, ref error_type, ref message }
                if error_type == "unknown" && message == "upstream connect error"
        ));
    }

    #[test]
    fn test_busy_statuses() {
        let limited = ClaudeError::from_response(StatusCode::TOO_MANY_REQUESTS, Some(12), "");
        assert_eq!(limited.to_string(), "rate limited, retry after 12 seconds");
        assert!(limited.is_busy());

        let limited = ClaudeError::from_response(StatusCode::TOO_MANY_REQUESTS, None, "");
        assert!(matches!(
            limited,
            ClaudeError::RateLimited { retry_after_secs: 60 }
        ));

        let status = StatusCode::from_u16(529).expect("529 is a valid status");
        let overloaded = ClaudeError::from_response(status, None, "{}");
        assert!(matches!(overloaded, ClaudeError::Overloaded));
        assert!(overloaded.is_busy());
    }

    #[test]
    fn test_refused_key() {
        assert!(matches!(
            ClaudeError::from_response(StatusCode::UNAUTHORIZED, None, "{}"),
            ClaudeError::Unauthorized
        ));
    }
}
