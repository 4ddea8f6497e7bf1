//! GoCart storefront library.
//!
//! The customer-facing marketplace API: multi-store checkout, coupons,
//! carts, addresses, ratings, store applications and payment webhooks.
//! The binary in `main.rs` wires these into a server; the admin back office
//! reuses the repositories, identity client and extractors from here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod stripe;
