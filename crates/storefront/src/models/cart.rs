//! Versioned shopping cart.

use std::collections::BTreeMap;

use serde::Serialize;

use gocart_core::ProductId;

/// A user's cart: product id to quantity, plus an optimistic-concurrency
/// version. A user without a stored cart has an empty cart at version 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    #[serde(rename = "cart")]
    pub items: BTreeMap<ProductId, u32>,
    pub version: i64,
}
