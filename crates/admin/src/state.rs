//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use gocart_storefront::identity::{IdentityClient, IdentityError};

use crate::claude::{ClaudeClient, ClaudeError};
use crate::config::AdminConfig;

/// Error building application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
    #[error("claude client: {0}")]
    Claude(#[from] ClaudeError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    identity: IdentityClient,
    claude: ClaudeClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an external client cannot be configured.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let identity = IdentityClient::new(&config.identity)?;
        let claude = ClaudeClient::new(&config.claude)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                identity,
                claude,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the identity provider client.
    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }

    /// Get the Claude client.
    #[must_use]
    pub fn claude(&self) -> &ClaudeClient {
        &self.inner.claude
    }
}

impl FromRef<AppState> for IdentityClient {
    fn from_ref(state: &AppState) -> Self {
        state.inner.identity.clone()
    }
}
