//! GoCart back-office library.
//!
//! Admin tools (store review, coupon management) and seller tools (listing
//! products, AI-drafted listings) served as a separate binary from the
//! storefront. Repositories, the identity client and bearer-token
//! authentication are shared with `gocart-storefront`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claude;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
