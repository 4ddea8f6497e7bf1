//! Checkout orchestration.
//!
//! One checkout runs these steps, in order, inside one request:
//!
//! 1. the shipping address must belong to the caller;
//! 2. requested items are priced from the catalog and grouped per store;
//! 3. an optional coupon is evaluated against the caller's standing;
//! 4. each store group is priced into an order draft;
//! 5. every draft is written in a single transaction;
//! 6. payment is routed: cash on delivery commits and clears the cart, card
//!    payment opens a hosted session before committing. A card checkout with
//!    nothing left to pay is settled like cash on delivery, already paid.
//!
//! Any failure before commit leaves no orders behind. The transaction holds a
//! pooled connection while the gateway call runs.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, instrument};
use url::Url;

use gocart_core::checkout::{
    CouponRejection, CustomerStanding, EmptyCart, LineItemRequest, PricingPolicy, evaluate_coupon,
    partition_by_store, price_orders,
};
use gocart_core::{
    AddressId, CouponCode, MoneyError, OrderId, PaymentMethod, UserId, to_minor_units,
};

use crate::db::{
    AddressRepository, CartRepository, CouponRepository, OrderRepository, ProductRepository,
    RepositoryError, UserRepository,
};
use crate::identity::Identity;
use crate::state::AppState;
use crate::stripe::{CheckoutSessionRequest, PaymentGateway, StripeError};

/// How long a hosted payment session stays open.
const SESSION_LIFETIME_MINUTES: i64 = 30;

/// Settings a checkout reads besides the database and gateway.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub pricing: PricingPolicy,
    /// Storefront URL the gateway redirects back to.
    pub base_url: Url,
}

/// A validated checkout request.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub address_id: AddressId,
    pub items: Vec<LineItemRequest>,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<CouponCode>,
}

/// What the client should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Orders are placed; nothing left to pay online.
    Placed { order_ids: Vec<OrderId> },
    /// Orders await payment at `url`.
    Redirect { url: String, order_ids: Vec<OrderId> },
}

/// Errors that abort a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Coupon(#[from] CouponRejection),

    #[error(transparent)]
    EmptyCart(#[from] EmptyCart),

    #[error("address not found")]
    AddressNotFound,

    #[error(transparent)]
    Payment(#[from] StripeError),

    #[error(transparent)]
    Amount(#[from] MoneyError),
}

/// Place the caller's orders using the storefront's database and Stripe.
///
/// # Errors
///
/// Returns `CheckoutError` if validation, persistence or the payment gateway
/// fails. No orders are committed in that case.
pub async fn place_order(
    state: &AppState,
    identity: &Identity,
    request: CheckoutRequest,
) -> Result<CheckoutOutcome, CheckoutError> {
    let settings = CheckoutSettings {
        pricing: PricingPolicy {
            shipping_fee: state.config().shipping_fee,
        },
        base_url: state.config().base_url.clone(),
    };
    place_order_with(state.pool(), state.stripe(), &settings, identity, request).await
}

/// Place the caller's orders against an explicit pool and gateway.
///
/// # Errors
///
/// Returns `CheckoutError` if validation, persistence or the payment gateway
/// fails. No orders are committed in that case.
#[instrument(skip_all, fields(user_id = %identity.user_id, payment_method = ?request.payment_method))]
pub async fn place_order_with<G: PaymentGateway>(
    pool: &PgPool,
    gateway: &G,
    settings: &CheckoutSettings,
    identity: &Identity,
    request: CheckoutRequest,
) -> Result<CheckoutOutcome, CheckoutError> {
    let user_id = &identity.user_id;

    AddressRepository::new(pool)
        .find_for_user(user_id, request.address_id)
        .await?
        .ok_or(CheckoutError::AddressNotFound)?;

    let product_ids: Vec<_> = request.items.iter().map(|i| i.product_id).collect();
    let catalog = ProductRepository::new(pool).pricing_for(&product_ids).await?;
    let groups = partition_by_store(&request.items, &catalog);

    let coupon = match &request.coupon_code {
        Some(code) => {
            let found = CouponRepository::new(pool).find(code).await?;
            let standing = CustomerStanding {
                prior_orders: OrderRepository::new(pool).count_for_user(user_id).await?,
                is_member: identity.is_member,
            };
            evaluate_coupon(found.as_ref(), Some(&standing), Utc::now())?;
            found
        }
        None => None,
    };

    let plan = price_orders(groups, coupon.as_ref(), identity.is_member, &settings.pricing)?;

    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;
    UserRepository::upsert(&mut tx, identity).await?;

    let mut order_ids = Vec::with_capacity(plan.drafts.len());
    for draft in &plan.drafts {
        let id = OrderRepository::insert_draft(
            &mut tx,
            user_id,
            request.address_id,
            request.payment_method,
            draft,
            plan.coupon.as_ref(),
        )
        .await?;
        order_ids.push(id);
    }

    let mut open_session = None;
    let outcome = match request.payment_method {
        PaymentMethod::Cod => {
            CartRepository::clear(&mut tx, user_id).await?;
            CheckoutOutcome::Placed { order_ids }
        }
        // Stripe refuses zero-amount sessions
        PaymentMethod::Stripe if plan.full_amount.is_zero() => {
            OrderRepository::mark_paid(&mut tx, user_id, &order_ids).await?;
            CartRepository::clear(&mut tx, user_id).await?;
            CheckoutOutcome::Placed { order_ids }
        }
        PaymentMethod::Stripe => {
            let (session_id, url) =
                open_payment_session(gateway, settings, plan.full_amount, &order_ids, user_id)
                    .await?;
            open_session = Some(session_id);
            CheckoutOutcome::Redirect { url, order_ids }
        }
    };

    if let Err(e) = tx.commit().await {
        if let Some(session_id) = &open_session {
            expire_orphaned_session(gateway, session_id).await;
        }
        return Err(RepositoryError::from(e).into());
    }

    info!(
        order_count = plan.drafts.len(),
        full_amount = %plan.full_amount,
        coupon = plan.coupon.as_ref().map(|c| c.code.as_str()),
        "Checkout placed"
    );

    Ok(outcome)
}

/// Open one hosted session for the whole checkout. Returns its id and URL.
async fn open_payment_session<G: PaymentGateway>(
    gateway: &G,
    settings: &CheckoutSettings,
    full_amount: Decimal,
    order_ids: &[OrderId],
    user_id: &UserId,
) -> Result<(String, String), CheckoutError> {
    let join = |path: &str| {
        settings
            .base_url
            .join(path)
            .map_err(|e| StripeError::Config(format!("invalid redirect URL: {e}")))
    };

    let session = gateway
        .create_checkout_session(&CheckoutSessionRequest {
            amount_minor: to_minor_units(full_amount)?,
            order_ids,
            user_id,
            success_url: join("loading?nextUrl=orders")?,
            cancel_url: join("cart")?,
            expires_at: (Utc::now() + Duration::minutes(SESSION_LIFETIME_MINUTES)).timestamp(),
        })
        .await?;

    match session.url {
        Some(url) => Ok((session.id, url)),
        None => {
            expire_orphaned_session(gateway, &session.id).await;
            Err(StripeError::Parse("checkout session has no URL".to_owned()).into())
        }
    }
}

/// Close a session whose orders were never committed, so it cannot be paid.
async fn expire_orphaned_session<G: PaymentGateway>(gateway: &G, session_id: &str) {
    error!(session_id, "Checkout session has no committed orders, expiring it");
    if let Err(e) = gateway.expire_checkout_session(session_id).await {
        error!(session_id, error = %e, "Failed to expire orphaned checkout session");
    }
}
