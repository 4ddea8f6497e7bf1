//! Core types for GoCart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coupon_code;
pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use coupon_code::{CouponCode, CouponCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{MoneyError, round_currency, to_minor_units, validate_percentage};
pub use status::*;
