//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Turns a multi-store item list into per-store orders and
//!   routes payment (cash on delivery or hosted card checkout)
//! - `payments` - Applies payment-confirmation webhooks to stored orders

pub mod checkout;
pub mod payments;
