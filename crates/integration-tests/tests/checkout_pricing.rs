//! Integration tests for the checkout engine.
//!
//! These tests run a cart through partitioning, coupon evaluation and
//! per-store pricing together, the way the storefront's checkout does.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use gocart_core::checkout::{
    Coupon, CouponRejection, CustomerStanding, EmptyCart, LineItemRequest, PricedProduct,
    PricingPolicy, evaluate_coupon, partition_by_store, price_orders,
};
use gocart_core::{CouponCode, ProductId, StoreId, to_minor_units};

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

struct Catalog {
    products: HashMap<ProductId, PricedProduct>,
}

impl Catalog {
    fn new() -> Self {
        Self {
            products: HashMap::new(),
        }
    }

    fn add(&mut self, store_id: StoreId, price: Decimal) -> ProductId {
        let id = ProductId::generate();
        self.products.insert(
            id,
            PricedProduct {
                id,
                store_id,
                price,
            },
        );
        id
    }
}

fn line(product_id: ProductId, quantity: u32) -> LineItemRequest {
    LineItemRequest {
        product_id,
        quantity,
    }
}

fn coupon(code: &str, percent: i64, now: DateTime<Utc>) -> Coupon {
    Coupon {
        code: CouponCode::parse(code).expect("valid code"),
        description: String::new(),
        discount: Decimal::from(percent),
        is_public: false,
        for_new_user: false,
        for_member: false,
        expires_at: now + Duration::days(7),
        created_at: now,
    }
}

// =============================================================================
// Multi-store Checkout
// =============================================================================

#[test]
fn test_two_store_checkout_with_coupon() {
    let now = Utc::now();
    let (books, mugs) = (StoreId::generate(), StoreId::generate());

    let mut catalog = Catalog::new();
    let novel = catalog.add(books, cents(1000));
    let atlas = catalog.add(books, cents(550));
    let mug = catalog.add(mugs, cents(333));

    let items = [line(novel, 2), line(mug, 1), line(atlas, 1)];
    let groups = partition_by_store(&items, &catalog.products);

    let code = coupon("TENOFF", 10, now);
    let customer = CustomerStanding {
        prior_orders: 3,
        is_member: false,
    };
    let accepted = evaluate_coupon(Some(&code), Some(&customer), now).expect("coupon accepted");

    let plan = price_orders(groups, Some(accepted), customer.is_member, &PricingPolicy::default())
        .expect("non-empty cart");

    let [first, second] = plan.drafts.as_slice() else {
        panic!("expected two drafts, got {}", plan.drafts.len());
    };

    // Store order follows the cart
    assert_eq!(first.store_id, books);
    assert_eq!(second.store_id, mugs);

    // 25.50 - 10% + 5.00 shipping
    assert_eq!(first.subtotal, cents(2550));
    assert_eq!(first.shipping, cents(500));
    assert_eq!(first.total, cents(2795));

    // 3.33 - 10% = 2.997, rounded
    assert_eq!(second.shipping, Decimal::ZERO);
    assert_eq!(second.total, cents(300));

    assert_eq!(plan.full_amount, cents(3095));
    assert_eq!(to_minor_units(plan.full_amount).expect("fits"), 3095);

    let snapshot = plan.coupon.expect("coupon recorded");
    assert_eq!(snapshot.code.as_str(), "TENOFF");
    assert_eq!(snapshot.discount, Decimal::from(10));
}

#[test]
fn test_member_checkout_skips_shipping() {
    let mut catalog = Catalog::new();
    let store = StoreId::generate();
    let lamp = catalog.add(store, cents(4999));

    let groups = partition_by_store(&[line(lamp, 1)], &catalog.products);
    let plan = price_orders(groups, None, true, &PricingPolicy::default()).expect("non-empty");

    assert_eq!(plan.full_amount, cents(4999));
    assert!(plan.drafts.iter().all(|d| d.shipping == Decimal::ZERO));
    assert!(plan.coupon.is_none());
}

#[test]
fn test_shipping_fee_comes_from_policy() {
    let mut catalog = Catalog::new();
    let store = StoreId::generate();
    let pen = catalog.add(store, cents(199));

    let policy = PricingPolicy {
        shipping_fee: cents(1250),
    };
    let groups = partition_by_store(&[line(pen, 2)], &catalog.products);
    let plan = price_orders(groups, None, false, &policy).expect("non-empty");

    assert_eq!(plan.full_amount, cents(1648));
}

#[test]
fn test_full_amount_is_sum_of_rounded_totals() {
    let now = Utc::now();
    let mut catalog = Catalog::new();
    let items: Vec<_> = (0..3)
        .map(|_| line(catalog.add(StoreId::generate(), cents(105)), 1))
        .collect();

    let code = coupon("THIRD", 33, now);
    let groups = partition_by_store(&items, &catalog.products);
    let plan = price_orders(groups, Some(&code), true, &PricingPolicy::default())
        .expect("non-empty");

    // 1.05 - 33% = 0.7035 -> 0.70 per store
    assert_eq!(plan.drafts.len(), 3);
    assert!(plan.drafts.iter().all(|d| d.total == cents(70)));
    assert_eq!(plan.full_amount, cents(210));
}

// =============================================================================
// Cart Contents
// =============================================================================

#[test]
fn test_stale_products_are_dropped() {
    let mut catalog = Catalog::new();
    let store = StoreId::generate();
    let kept = catalog.add(store, cents(800));

    let items = [line(ProductId::generate(), 4), line(kept, 1)];
    let groups = partition_by_store(&items, &catalog.products);
    let plan = price_orders(groups, None, false, &PricingPolicy::default()).expect("non-empty");

    assert_eq!(plan.drafts.len(), 1);
    assert_eq!(plan.full_amount, cents(1300));
}

#[test]
fn test_cart_of_only_stale_products_is_empty() {
    let catalog = Catalog::new();
    let groups = partition_by_store(&[line(ProductId::generate(), 1)], &catalog.products);

    assert_eq!(
        price_orders(groups, None, false, &PricingPolicy::default()),
        Err(EmptyCart)
    );
}

#[test]
fn test_repeated_lines_merge() {
    let mut catalog = Catalog::new();
    let store = StoreId::generate();
    let sock = catalog.add(store, cents(250));

    let groups = partition_by_store(&[line(sock, 2), line(sock, 3)], &catalog.products);
    let plan = price_orders(groups, None, true, &PricingPolicy::default()).expect("non-empty");

    let draft = plan.drafts.first().expect("one draft");
    assert_eq!(draft.lines.len(), 1);
    assert_eq!(draft.lines.first().expect("one line").quantity, 5);
    assert_eq!(draft.total, cents(1250));
}

// =============================================================================
// Coupon Eligibility
// =============================================================================

#[test]
fn test_new_user_coupon_only_for_first_order() {
    let now = Utc::now();
    let mut welcome = coupon("WELCOME", 20, now);
    welcome.for_new_user = true;

    let newcomer = CustomerStanding::default();
    let returning = CustomerStanding {
        prior_orders: 1,
        is_member: true,
    };

    assert!(evaluate_coupon(Some(&welcome), Some(&newcomer), now).is_ok());
    assert_eq!(
        evaluate_coupon(Some(&welcome), Some(&returning), now),
        Err(CouponRejection::NotEligibleNewUser)
    );
    assert_eq!(
        evaluate_coupon(Some(&welcome), None, now),
        Err(CouponRejection::LoginRequired)
    );
}

#[test]
fn test_public_coupon_skips_account_checks() {
    let now = Utc::now();
    let mut open = coupon("OPEN", 5, now);
    open.is_public = true;
    open.for_member = true;
    open.for_new_user = true;

    assert!(evaluate_coupon(Some(&open), None, now).is_ok());
}

#[test]
fn test_expired_coupon_reads_as_missing() {
    let now = Utc::now();
    let mut old = coupon("OLD", 5, now);
    old.is_public = true;
    old.expires_at = now;

    let expired = evaluate_coupon(Some(&old), None, now).expect_err("expired");
    let missing = evaluate_coupon(None, None, now).expect_err("missing");
    assert_eq!(expired.to_string(), missing.to_string());
}

#[test]
fn test_member_coupon() {
    let now = Utc::now();
    let mut plus = coupon("PLUS", 15, now);
    plus.for_member = true;

    let member = CustomerStanding {
        prior_orders: 9,
        is_member: true,
    };
    assert!(evaluate_coupon(Some(&plus), Some(&member), now).is_ok());
    assert_eq!(
        evaluate_coupon(Some(&plus), Some(&CustomerStanding::default()), now),
        Err(CouponRejection::MembersOnly)
    );
}
