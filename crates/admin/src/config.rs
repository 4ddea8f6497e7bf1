//! Back-office configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL of the back-office web client
//! - `ADMIN_EMAILS` - Comma-separated emails of marketplace administrators
//! - `IDENTITY_API_URL` - Base URL of the identity provider's verification API
//! - `IDENTITY_API_KEY` - Server-side key for the identity provider
//! - `CLAUDE_API_KEY` - Anthropic Claude API key (listing assistant)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `CLAUDE_MODEL` - Claude model ID (default: claude-sonnet-4-20250514)
//! - `MEMBER_PLAN` - Identity-provider plan that grants membership (default: plus)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use url::Url;

use gocart_core::Email;
use gocart_storefront::config::{
    IdentityConfig, get_database_url, get_env_or_default, get_optional_env, get_required_env,
    get_required_url, get_validated_secret, parse_env,
};

pub use gocart_storefront::config::ConfigError;

const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

/// Back-office application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the back-office client
    pub base_url: Url,
    /// Marketplace administrators
    pub admin_emails: Vec<Email>,
    /// Identity provider configuration
    pub identity: IdentityConfig,
    /// Claude AI configuration
    pub claude: ClaudeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Claude AI API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID (e.g., claude-sonnet-4-20250514)
    pub model: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = parse_env("ADMIN_HOST", "127.0.0.1")?;
        let port = parse_env("ADMIN_PORT", "3001")?;
        let base_url = get_required_url("ADMIN_BASE_URL")?;
        let admin_emails = parse_admin_emails(&get_required_env("ADMIN_EMAILS")?)?;

        let sentry_sample_rate = sample_rate("SENTRY_SAMPLE_RATE")?;
        let sentry_traces_sample_rate = sample_rate("SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            admin_emails,
            identity: IdentityConfig::from_env()?,
            claude: ClaudeConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether `email` belongs to a marketplace administrator.
    #[must_use]
    pub fn is_admin_email(&self, email: &Email) -> bool {
        self.admin_emails.iter().any(|admin| admin.matches(email.as_str()))
    }
}

impl ClaudeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("CLAUDE_API_KEY")?,
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
        })
    }
}

/// Parse the comma-separated admin allowlist. Blank entries are skipped.
fn parse_admin_emails(raw: &str) -> Result<Vec<Email>, ConfigError> {
    let emails = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Email::parse(s)
                .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_EMAILS".to_string(), e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if emails.is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            "ADMIN_EMAILS".to_string(),
            "must list at least one address".to_string(),
        ));
    }
    Ok(emails)
}

/// A Sentry sample rate in `[0, 1]`, defaulting to 1.
fn sample_rate(key: &str) -> Result<f32, ConfigError> {
    let rate: f32 = parse_env(key, "1.0")?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0.0 and 1.0".to_string(),
        ));
    }
    Ok(rate)
}
