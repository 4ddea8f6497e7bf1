//! Integration tests for GoCart.
//!
//! The tests in `tests/` exercise the crates together through their public
//! APIs: the checkout engine end to end, and the storefront and back-office
//! routers driven in-process with `tower::ServiceExt::oneshot`.
//!
//! Router tests use a lazily connected pool and only hit paths that answer
//! before touching the database, so no server or database is needed:
//!
//! ```bash
//! cargo test -p gocart-integration-tests
//! ```
//!
//! Checkout persistence tests need PostgreSQL. Each one runs against a fresh
//! database created by `sqlx::test`, so they are ignored by default:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/gocart cargo test -p gocart-integration-tests -- --ignored
//! ```
