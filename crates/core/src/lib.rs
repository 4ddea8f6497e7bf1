//! GoCart Core - Shared types and the checkout pricing engine.
//!
//! This crate provides the domain types used across all GoCart components:
//! - `storefront` - Customer-facing marketplace API
//! - `admin` - Back-office API for admins and sellers
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Checkout pricing lives here so every rule can be
//! unit tested without a database or a payment gateway.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, coupon codes, money and statuses
//! - [`checkout`] - Cart partitioning, coupon eligibility and per-store pricing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod checkout;
pub mod types;

pub use types::*;
