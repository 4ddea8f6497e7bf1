//! Stripe REST client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{CheckoutSession, CheckoutSessionRequest, Event, PaymentGateway, StripeError, webhook};
use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Client for Stripe hosted checkout.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    webhook_secret: SecretString,
    currency: String,
    app_id: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns error if the secret key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| StripeError::Config(format!("invalid secret key format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            inner: Arc::new(StripeClientInner {
                client,
                webhook_secret: config.webhook_secret.clone(),
                currency: config.currency.clone(),
                app_id: config.app_id.clone(),
            }),
        })
    }

    /// The application id stamped on session metadata.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.inner.app_id
    }

    /// Verify a webhook delivery and decode its event.
    ///
    /// # Errors
    ///
    /// Returns error if the signature is invalid or the payload malformed.
    pub fn construct_event(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<Event, StripeError> {
        webhook::construct_event(
            payload,
            signature,
            self.inner.webhook_secret.expose_secret(),
            now,
        )
    }
}

impl PaymentGateway for StripeClient {
    /// Open a hosted checkout session charging one line item.
    #[instrument(skip_all, fields(amount_minor = request.amount_minor, orders = request.order_ids.len()))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        let form = request.to_form(&self.inner.currency, &self.inner.app_id);
        let response = self
            .inner
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .form(&form)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let session: CheckoutSession = response.json().await?;
        info!(session_id = %session.id, "Created checkout session");
        Ok(session)
    }

    #[instrument(skip(self))]
    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), StripeError> {
        let response = self
            .inner
            .client
            .post(format!("{BASE_URL}/checkout/sessions/{session_id}/expire"))
            .send()
            .await?;

        ensure_success(response).await?;
        info!("Expired checkout session");
        Ok(())
    }
}

/// Turn a non-2xx response into `StripeError::Api` with Stripe's message.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StripeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);
    Err(StripeError::Api {
        status: status.as_u16(),
        message,
    })
}
