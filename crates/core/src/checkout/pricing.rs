//! Per-store order pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coupon::Coupon;
use super::partition::{PricedLine, StoreGroup};
use crate::types::{CouponCode, StoreId, round_currency};

/// Marketplace-wide pricing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Flat fee charged once per checkout to non-members.
    pub shipping_fee: Decimal,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            shipping_fee: Decimal::new(500, 2),
        }
    }
}

/// The coupon as it was when an order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponSnapshot {
    pub code: CouponCode,
    pub discount: Decimal,
}

/// A priced, not yet persisted, order for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub store_id: StoreId,
    pub lines: Vec<PricedLine>,
    /// Sum of line totals before discount and shipping.
    pub subtotal: Decimal,
    /// Shipping charged on this order; zero for all but at most one draft.
    pub shipping: Decimal,
    /// Rounded amount the customer pays for this order.
    pub total: Decimal,
}

/// Everything needed to persist and pay for one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    /// One draft per store, in partition order.
    pub drafts: Vec<OrderDraft>,
    /// Sum of the rounded draft totals.
    pub full_amount: Decimal,
    pub coupon: Option<CouponSnapshot>,
}

/// No line item survived partitioning.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no valid items to order")]
pub struct EmptyCart;

/// Price each store group.
///
/// The coupon discount applies to each store's own subtotal. Non-members pay
/// the shipping fee once, on the first group. Each total is rounded to cents
/// and the full amount is the sum of the rounded totals.
///
/// # Errors
///
/// Returns [`EmptyCart`] if `groups` is empty.
pub fn price_orders(
    groups: Vec<StoreGroup>,
    coupon: Option<&Coupon>,
    is_member: bool,
    policy: &PricingPolicy,
) -> Result<CheckoutPlan, EmptyCart> {
    if groups.is_empty() {
        return Err(EmptyCart);
    }

    let mut shipping_charged = is_member;
    let mut full_amount = Decimal::ZERO;
    let mut drafts = Vec::with_capacity(groups.len());

    for group in groups {
        let subtotal = group.subtotal();
        let discounted = coupon.map_or(subtotal, |c| c.apply(subtotal));

        let shipping = if shipping_charged {
            Decimal::ZERO
        } else {
            shipping_charged = true;
            policy.shipping_fee
        };

        let total = round_currency(discounted + shipping);
        full_amount += total;

        drafts.push(OrderDraft {
            store_id: group.store_id,
            lines: group.lines,
            subtotal,
            shipping,
            total,
        });
    }

    Ok(CheckoutPlan {
        drafts,
        full_amount,
        coupon: coupon.map(|c| CouponSnapshot {
            code: c.code.clone(),
            discount: c.discount,
        }),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::types::ProductId;

    fn group(store: StoreId, lines: &[(i64, u32)]) -> StoreGroup {
        StoreGroup {
            store_id: store,
            lines: lines
                .iter()
                .map(|&(cents, quantity)| PricedLine {
                    product_id: ProductId::generate(),
                    quantity,
                    price: Decimal::new(cents, 2),
                })
                .collect(),
        }
    }

    fn coupon(percent: i64) -> Coupon {
        Coupon {
            code: CouponCode::parse("TAKE").unwrap(),
            description: String::new(),
            discount: Decimal::new(percent, 0),
            is_public: true,
            for_new_user: false,
            for_member: false,
            expires_at: Utc::now() + Duration::days(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_store_non_member_pays_shipping() {
        let plan = price_orders(
            vec![group(StoreId::generate(), &[(1000, 2)])],
            None,
            false,
            &PricingPolicy::default(),
        )
        .unwrap();

        assert_eq!(plan.drafts.len(), 1);
        assert_eq!(plan.drafts[0].total, Decimal::new(2500, 2));
        assert_eq!(plan.full_amount, Decimal::new(2500, 2));
        assert!(plan.coupon.is_none());
    }

    #[test]
    fn test_shipping_goes_to_first_store_only() {
        let plan = price_orders(
            vec![
                group(StoreId::generate(), &[(2000, 1)]),
                group(StoreId::generate(), &[(1500, 2)]),
            ],
            None,
            false,
            &PricingPolicy::default(),
        )
        .unwrap();

        assert_eq!(plan.drafts[0].total, Decimal::new(2500, 2));
        assert_eq!(plan.drafts[1].total, Decimal::new(3000, 2));
        assert_eq!(plan.drafts[1].shipping, Decimal::ZERO);
        assert_eq!(plan.full_amount, Decimal::new(5500, 2));
    }

    #[test]
    fn test_members_pay_no_shipping() {
        let plan = price_orders(
            vec![group(StoreId::generate(), &[(1000, 1)])],
            None,
            true,
            &PricingPolicy::default(),
        )
        .unwrap();
        assert_eq!(plan.drafts[0].total, Decimal::new(1000, 2));
    }

    #[test]
    fn test_coupon_applies_per_store_before_shipping() {
        let plan = price_orders(
            vec![
                group(StoreId::generate(), &[(2000, 1)]),
                group(StoreId::generate(), &[(3000, 1)]),
            ],
            Some(&coupon(10)),
            false,
            &PricingPolicy::default(),
        )
        .unwrap();

        // 20 * 0.9 + 5, then 30 * 0.9
        assert_eq!(plan.drafts[0].total, Decimal::new(2300, 2));
        assert_eq!(plan.drafts[1].total, Decimal::new(2700, 2));
        assert_eq!(plan.drafts[0].subtotal, Decimal::new(2000, 2));

        let snapshot = plan.coupon.unwrap();
        assert_eq!(snapshot.code.as_str(), "TAKE");
        assert_eq!(snapshot.discount, Decimal::TEN);
    }

    #[test]
    fn test_totals_rounded_and_summed_after_rounding() {
        // 3 x 3.33 = 9.99, 15% off = 8.4915 -> 8.49 each
        let plan = price_orders(
            vec![
                group(StoreId::generate(), &[(333, 3)]),
                group(StoreId::generate(), &[(333, 3)]),
            ],
            Some(&coupon(15)),
            true,
            &PricingPolicy::default(),
        )
        .unwrap();

        assert_eq!(plan.drafts[0].total, Decimal::new(849, 2));
        assert_eq!(plan.full_amount, Decimal::new(1698, 2));
    }

    #[test]
    fn test_custom_shipping_fee() {
        let policy = PricingPolicy {
            shipping_fee: Decimal::new(799, 2),
        };
        let plan = price_orders(vec![group(StoreId::generate(), &[(100, 1)])], None, false, &policy)
            .unwrap();
        assert_eq!(plan.drafts[0].total, Decimal::new(899, 2));
    }

    #[test]
    fn test_empty_groups_rejected() {
        assert_eq!(
            price_orders(Vec::new(), None, false, &PricingPolicy::default()),
            Err(EmptyCart)
        );
    }
}
