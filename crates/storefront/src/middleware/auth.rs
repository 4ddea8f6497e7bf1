//! Authentication extractors.
//!
//! Callers authenticate with an identity-provider session token in the
//! `Authorization: Bearer <token>` header. The token is verified through
//! [`IdentityClient`], which caches answers briefly.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::set_sentry_user;
use crate::identity::{Identity, IdentityClient, IdentityError};

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(identity): RequireAuth) -> impl IntoResponse {
///     identity.user_id.to_string()
/// }
/// ```
pub struct RequireAuth(pub Identity);

/// Extractor that resolves the caller if a valid token is present.
///
/// Requests without a token, or with one the provider rejects, are anonymous.
pub struct OptionalAuth(pub Option<Identity>);

/// Why authentication failed.
#[derive(Debug)]
pub enum AuthRejection {
    /// No token, or the identity provider did not recognize it.
    Unauthenticated,
    /// The identity provider could not be asked.
    Unavailable(IdentityError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "not authorized" })),
            )
                .into_response(),
            Self::Unavailable(err) => {
                let event_id = sentry::capture_error(&err);
                tracing::error!(error = %err, sentry_event_id = %event_id, "Identity lookup failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "error": "Identity service unavailable" })),
                )
                    .into_response()
            }
        }
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn resolve<S>(parts: &Parts, state: &S) -> Result<Option<Identity>, AuthRejection>
where
    IdentityClient: FromRef<S>,
{
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };
    let client = IdentityClient::from_ref(state);
    let identity = client
        .verify(token)
        .await
        .map_err(AuthRejection::Unavailable)?;

    if let Some(identity) = &identity {
        set_sentry_user(&identity.user_id, identity.email.as_ref().map(|e| e.as_str()));
    }
    Ok(identity)
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    IdentityClient: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(Self)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
    IdentityClient: FromRef<S>,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/orders");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&parts_with(Some("bearer   tok "))), Some("tok"));
        assert_eq!(bearer_token(&parts_with(Some("Basic dXNlcg=="))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[tokio::test]
    async fn test_unauthenticated_body() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "not authorized" }));
    }
}
