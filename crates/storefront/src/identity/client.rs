//! HTTP client for the identity provider's token verification API.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};
use url::Url;

use gocart_core::{Email, UserId};

use super::{Identity, IdentityError};
use crate::config::IdentityConfig;

/// Verification endpoint, relative to the configured API URL.
const VERIFY_PATH: &str = "v1/sessions/verify";

/// How long a verified token is trusted without asking again.
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Response body of a successful verification.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifiedSession {
    user_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image_url: String,
    #[serde(default)]
    plans: Vec<String>,
}

/// Client for the identity provider.
///
/// Cheap to clone; verified identities are cached for one minute keyed by a
/// SHA-256 digest of the token, so raw tokens are never kept in memory.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    verify_url: Url,
    member_plan: String,
    cache: Cache<String, Identity>,
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Config` if the API key is not a valid header
    /// value or the verification URL cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| IdentityError::Config(format!("invalid API key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()?;

        let verify_url = config
            .api_url
            .join(VERIFY_PATH)
            .map_err(|e| IdentityError::Config(format!("invalid identity URL: {e}")))?;

        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                verify_url,
                member_plan: config.member_plan.clone(),
                cache,
            }),
        })
    }

    /// Resolve a bearer token to an identity.
    ///
    /// Returns `Ok(None)` when the provider does not recognize the token.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the provider cannot be reached or answers
    /// with an unexpected status.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Option<Identity>, IdentityError> {
        let key = hex::encode(Sha256::digest(token.as_bytes()));
        if let Some(identity) = self.inner.cache.get(&key).await {
            return Ok(Some(identity));
        }

        let response = self
            .inner
            .client
            .post(self.inner.verify_url.clone())
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND) {
            debug!(status = status.as_u16(), "token rejected by identity provider");
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: VerifiedSession = response.json().await?;
        let identity = to_identity(session, &self.inner.member_plan);
        self.inner.cache.insert(key, identity.clone()).await;
        Ok(Some(identity))
    }
}

fn to_identity(session: VerifiedSession, member_plan: &str) -> Identity {
    Identity {
        user_id: UserId::new(session.user_id),
        email: session.email.as_deref().and_then(|e| Email::parse(e).ok()),
        name: session.name,
        image_url: session.image_url,
        is_member: session
            .plans
            .iter()
            .any(|plan| plan.eq_ignore_ascii_case(member_plan)),
    }
}
