//! Access extractors for admins and sellers.
//!
//! Both build on the storefront's bearer-token [`RequireAuth`]: the caller
//! must first be a verified identity, then pass a role check.
//!
//! - Admin: the caller's email is in `ADMIN_EMAILS`.
//! - Seller: the caller owns a store that is approved and active.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use gocart_storefront::db::StoreRepository;
use gocart_storefront::identity::Identity;
use gocart_storefront::middleware::{AuthRejection, RequireAuth};
use gocart_storefront::models::Store;

use crate::config::AdminConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a marketplace administrator.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     admin.user_id.to_string()
/// }
/// ```
pub struct RequireAdmin(pub Identity);

/// Extractor that requires the owner of a selling store.
pub struct RequireSeller {
    pub identity: Identity,
    pub store: Store,
}

/// Why an access check failed.
pub enum AccessRejection {
    /// Not signed in, or the identity provider is unavailable.
    Auth(AuthRejection),
    /// Signed in but not an administrator.
    NotAdmin,
    /// Signed in but without a selling store.
    NotSeller,
    /// The store lookup failed.
    Lookup(AppError),
}

impl IntoResponse for AccessRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(rejection) => rejection.into_response(),
            Self::NotAdmin => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": "Forbidden" }))).into_response()
            }
            Self::NotSeller => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "not authorized" })),
            )
                .into_response(),
            Self::Lookup(err) => err.into_response(),
        }
    }
}

/// Whether `identity` is on the admin allowlist.
///
/// Identities without a verified email are never admins.
#[must_use]
pub fn is_admin(config: &AdminConfig, identity: &Identity) -> bool {
    identity
        .email
        .as_ref()
        .is_some_and(|email| config.is_admin_email(email))
}

/// Find the caller's store if it is currently allowed to sell.
///
/// # Errors
///
/// Returns `AppError::Database` if the lookup fails.
pub async fn selling_store(state: &AppState, identity: &Identity) -> Result<Option<Store>, AppError> {
    let store = StoreRepository::new(state.pool())
        .find_by_user(&identity.user_id)
        .await?;
    Ok(store.filter(Store::is_selling))
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AccessRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(AccessRejection::Auth)?;

        if !is_admin(state.config(), &identity) {
            tracing::warn!(user_id = %identity.user_id, "Non-admin tried an admin route");
            return Err(AccessRejection::NotAdmin);
        }
        Ok(Self(identity))
    }
}

impl FromRequestParts<AppState> for RequireSeller {
    type Rejection = AccessRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(identity) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(AccessRejection::Auth)?;

        let store = selling_store(state, &identity)
            .await
            .map_err(AccessRejection::Lookup)?
            .ok_or(AccessRejection::NotSeller)?;

        Ok(Self { identity, store })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use url::Url;

    use gocart_core::{Email, UserId};
    use gocart_storefront::config::IdentityConfig;

    use super::*;
    use crate::config::ClaudeConfig;

    fn config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/gocart"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: Url::parse("http://localhost:3001").unwrap(),
            admin_emails: vec![Email::parse("ops@gocart.test").unwrap()],
            identity: IdentityConfig {
                api_url: Url::parse("http://localhost:4000").unwrap(),
                api_key: SecretString::from("identity-key"),
                member_plan: "plus".to_string(),
            },
            claude: ClaudeConfig {
                api_key: SecretString::from("sk-ant-test"),
                model: "claude-sonnet-4-20250514".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    fn identity(email: Option<&str>) -> Identity {
        Identity {
            user_id: UserId::new("user_2abc"),
            email: email.map(|e| Email::parse(e).unwrap()),
            name: "Ops".to_string(),
            image_url: String::new(),
            is_member: false,
        }
    }

    #[test]
    fn test_is_admin() {
        let config = config();
        assert!(is_admin(&config, &identity(Some("OPS@gocart.test"))));
        assert!(!is_admin(&config, &identity(Some("shopper@gocart.test"))));
        assert!(!is_admin(&config, &identity(None)));
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AccessRejection::NotAdmin.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AccessRejection::NotSeller.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AccessRejection::Auth(AuthRejection::Unauthenticated)
                .into_response()
                .status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
