//! HTTP middleware for the back office.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (shared with the storefront)
//! 4. CORS
//! 5. Rate limiting on seller routes
//!
//! Access control is per handler via the [`RequireAdmin`] and
//! [`RequireSeller`] extractors.

pub mod auth;

pub use auth::{AccessRejection, RequireAdmin, RequireSeller, is_admin, selling_store};
