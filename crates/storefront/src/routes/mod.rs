//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness probe
//! GET  /health/ready           - Readiness probe (database)
//!
//! # Checkout (strict rate limit on writes)
//! POST /api/orders             - Place per-store orders (COD or Stripe)
//! GET  /api/orders             - Order history
//! POST /api/coupon             - Verify a coupon for the caller
//!
//! # Cart
//! GET    /api/cart             - Current cart and version
//! POST   /api/cart             - Replace cart (optimistic version check)
//! DELETE /api/cart             - Clear cart
//!
//! # Account
//! GET  /api/address            - Saved addresses
//! POST /api/address            - Add an address
//! GET  /api/rating             - Ratings given
//! POST /api/rating             - Rate an ordered product
//!
//! # Sellers
//! GET  /api/store/create       - Application status
//! POST /api/store/create       - Apply to open a store
//!
//! # Payments
//! POST /api/stripe             - Stripe webhook
//! ```

pub mod address;
pub mod cart;
pub mod coupon;
pub mod orders;
pub mod rating;
pub mod store;
pub mod stripe;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/orders",
            post(orders::place_order)
                .layer(checkout_rate_limiter())
                .get(orders::list_orders),
        )
        .route(
            "/coupon",
            post(coupon::verify).layer(checkout_rate_limiter()),
        )
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart",
            get(cart::show).post(cart::replace).delete(cart::clear),
        )
        .route("/address", get(address::list).post(address::create))
        .route("/rating", get(rating::list).post(rating::create))
        .route("/store/create", get(store::status).post(store::create))
        .layer(api_rate_limiter())
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(checkout_routes())
        .merge(account_routes())
        // Stripe retries from a small set of IPs; never throttle it
        .route("/stripe", post(stripe::webhook));

    Router::new().nest("/api", api)
}
