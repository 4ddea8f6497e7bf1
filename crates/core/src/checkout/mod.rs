//! Checkout pricing engine.
//!
//! A checkout runs three pure steps, in order:
//!
//! 1. [`partition_by_store`] groups the requested line items by the store that
//!    owns each product, pricing every line from the catalog.
//! 2. [`evaluate_coupon`] decides whether the customer may use a coupon.
//! 3. [`price_orders`] turns each store group into an [`OrderDraft`] with a
//!    rounded total, attributing the shipping fee to the first store.
//!
//! Persistence and payment routing happen in the storefront; nothing here
//! touches I/O.

mod coupon;
mod partition;
mod pricing;

pub use coupon::{Coupon, CouponRejection, CustomerStanding, evaluate_coupon};
pub use partition::{
    LineItemRequest, MAX_LINE_QUANTITY, PricedLine, PricedProduct, StoreGroup,
    partition_by_store,
};
pub use pricing::{
    CheckoutPlan, CouponSnapshot, EmptyCart, OrderDraft, PricingPolicy, price_orders,
};
