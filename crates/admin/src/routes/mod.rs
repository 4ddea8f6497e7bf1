//! HTTP route handlers for the back office.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness probe
//! GET  /health/ready                - Readiness probe (database)
//!
//! # Admin (ADMIN_EMAILS only)
//! GET    /api/admin/is-admin        - Whether the caller is an admin (always 200)
//! GET    /api/admin/approve-store   - Pending and rejected stores with owners
//! POST   /api/admin/approve-store   - Approve or reject a store
//! POST   /api/admin/toggle-store    - Switch a store on or off
//! GET    /api/admin/coupon          - List coupons
//! POST   /api/admin/coupon          - Create a coupon
//! DELETE /api/admin/coupon?code=    - Delete a coupon
//!
//! # Sellers (approved, active store owners)
//! GET  /api/store/is-seller         - Whether the caller may sell
//! POST /api/store/ai                - Draft a listing from a photo
//! GET  /api/store/product           - Store products
//! POST /api/store/product           - Add a product
//! ```

pub mod coupons;
pub mod seller;
pub mod stores;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use gocart_storefront::middleware::api_rate_limiter;

use crate::state::AppState;

/// Base64 images up to 5 MB plus JSON framing.
const LISTING_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/is-admin", get(stores::is_admin_check))
        .route(
            "/approve-store",
            get(stores::list_pending).post(stores::review),
        )
        .route("/toggle-store", post(stores::toggle))
        .route(
            "/coupon",
            get(coupons::list)
                .post(coupons::create)
                .delete(coupons::delete),
        )
}

/// Create the seller routes router.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/is-seller", get(seller::is_seller))
        .route(
            "/ai",
            post(seller::draft_listing).layer(DefaultBodyLimit::max(LISTING_BODY_LIMIT)),
        )
        .route(
            "/product",
            get(seller::list_products).post(seller::create_product),
        )
        .layer(api_rate_limiter())
}

/// Create all API routes for the back office.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/admin", admin_routes())
        .nest("/store", seller_routes());

    Router::new().nest("/api", api)
}
