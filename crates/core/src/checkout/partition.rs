//! Cart partitioning.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, StoreId};

/// Largest quantity a single order line may carry.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// A line item as requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The pricing-relevant view of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedProduct {
    pub id: ProductId,
    pub store_id: StoreId,
    pub price: Decimal,
}

/// A line item priced from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time of checkout.
    pub price: Decimal,
}

impl PricedLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// All lines of a checkout that belong to one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreGroup {
    pub store_id: StoreId,
    pub lines: Vec<PricedLine>,
}

impl StoreGroup {
    /// Sum of line totals before any discount or shipping.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(PricedLine::line_total).sum()
    }
}

/// Group requested line items by owning store.
///
/// - Products missing from `catalog` are dropped; carts can outlive products.
/// - Prices always come from `catalog`.
/// - Groups appear in the order their store was first seen among `items`.
/// - Repeated lines for the same product are merged into one line, capped at
///   [`MAX_LINE_QUANTITY`]. Callers reject larger totals before getting here.
#[must_use]
pub fn partition_by_store(
    items: &[LineItemRequest],
    catalog: &HashMap<ProductId, PricedProduct>,
) -> Vec<StoreGroup> {
    let mut groups: Vec<StoreGroup> = Vec::new();

    for item in items {
        let Some(product) = catalog.get(&item.product_id) else {
            continue;
        };

        let pos = if let Some(pos) = groups.iter().position(|g| g.store_id == product.store_id) {
            pos
        } else {
            groups.push(StoreGroup {
                store_id: product.store_id,
                lines: Vec::new(),
            });
            groups.len() - 1
        };
        let Some(group) = groups.get_mut(pos) else {
            continue;
        };

        match group.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_LINE_QUANTITY);
            }
            None => group.lines.push(PricedLine {
                product_id: product.id,
                quantity: item.quantity.min(MAX_LINE_QUANTITY),
                price: product.price,
            }),
        }
    }

    groups
}
