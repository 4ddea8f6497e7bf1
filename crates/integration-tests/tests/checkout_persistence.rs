//! Integration tests for checkout persistence and payment routing.
//!
//! Each test gets a fresh database with the storefront migrations applied.
//! The payment gateway is replaced by an in-memory one that records calls.
//!
//! Run with `DATABASE_URL` pointing at a PostgreSQL server:
//! `cargo test -p gocart-integration-tests -- --ignored`

use std::sync::Mutex;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use url::Url;

use gocart_core::checkout::{LineItemRequest, PricingPolicy};
use gocart_core::{AddressId, CouponCode, OrderId, PaymentMethod, ProductId, StoreId, UserId};
use gocart_storefront::identity::Identity;
use gocart_storefront::services::checkout::{
    CheckoutError, CheckoutOutcome, CheckoutRequest, CheckoutSettings, place_order_with,
};
use gocart_storefront::stripe::{
    CheckoutSession, CheckoutSessionRequest, PaymentGateway, StripeError,
};

const SESSION_ID: &str = "cs_test_checkout";
const SESSION_URL: &str = "https://checkout.stripe.test/c/cs_test_checkout";

fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

// =============================================================================
// Recording Gateway
// =============================================================================

#[derive(Default)]
struct RecordingGateway {
    decline: bool,
    created: Mutex<Vec<(i64, Vec<OrderId>)>>,
    expired: Mutex<Vec<String>>,
}

impl RecordingGateway {
    fn declining() -> Self {
        Self {
            decline: true,
            ..Self::default()
        }
    }

    fn created(&self) -> Vec<(i64, Vec<OrderId>)> {
        self.created.lock().expect("lock").clone()
    }

    fn expired(&self) -> Vec<String> {
        self.expired.lock().expect("lock").clone()
    }
}

impl PaymentGateway for RecordingGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest<'_>,
    ) -> Result<CheckoutSession, StripeError> {
        self.created
            .lock()
            .expect("lock")
            .push((request.amount_minor, request.order_ids.to_vec()));

        if self.decline {
            return Err(StripeError::Api {
                status: 400,
                message: "Your card was declined.".to_owned(),
            });
        }
        Ok(CheckoutSession {
            id: SESSION_ID.to_owned(),
            url: Some(SESSION_URL.to_owned()),
        })
    }

    async fn expire_checkout_session(&self, session_id: &str) -> Result<(), StripeError> {
        self.expired
            .lock()
            .expect("lock")
            .push(session_id.to_owned());
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

struct Marketplace {
    buyer: Identity,
    address_id: AddressId,
    books: StoreId,
    mugs: StoreId,
    novel: ProductId,
    atlas: ProductId,
    mug: ProductId,
}

fn settings() -> CheckoutSettings {
    CheckoutSettings {
        pricing: PricingPolicy::default(),
        base_url: Url::parse("https://shop.test/").expect("valid url"),
    }
}

async fn add_store(pool: &PgPool, seller: &str, username: &str) -> StoreId {
    sqlx::query("INSERT INTO app_user (id, email) VALUES ($1, $2)")
        .bind(seller)
        .bind(format!("{seller}@gocart.test"))
        .execute(pool)
        .await
        .expect("insert seller");

    let store_id = StoreId::generate();
    sqlx::query(
        r"
        INSERT INTO store (id, user_id, name, description, username, address, status,
                           is_active, logo, email, contact)
        VALUES ($1, $2, $3, 'Test store', $3, '1 Market St', 'approved', true,
                'https://img.test/logo.png', 'store@gocart.test', '555-0100')
        ",
    )
    .bind(store_id)
    .bind(seller)
    .bind(username)
    .execute(pool)
    .await
    .expect("insert store");
    store_id
}

async fn add_product(pool: &PgPool, store_id: StoreId, price: Decimal) -> ProductId {
    let product_id = ProductId::generate();
    sqlx::query(
        r"
        INSERT INTO product (id, store_id, name, description, mrp, price, category)
        VALUES ($1, $2, 'Item', 'A test item', $3, $3, 'misc')
        ",
    )
    .bind(product_id)
    .bind(store_id)
    .bind(price)
    .execute(pool)
    .await
    .expect("insert product");
    product_id
}

async fn add_coupon(pool: &PgPool, code: &str, percent: i64) {
    sqlx::query("INSERT INTO coupon (code, discount, expires_at) VALUES ($1, $2, $3)")
        .bind(code)
        .bind(Decimal::from(percent))
        .bind(Utc::now() + Duration::days(7))
        .execute(pool)
        .await
        .expect("insert coupon");
}

async fn marketplace(pool: &PgPool) -> Marketplace {
    let books = add_store(pool, "seller_books", "books").await;
    let mugs = add_store(pool, "seller_mugs", "mugs").await;
    let novel = add_product(pool, books, cents(1000)).await;
    let atlas = add_product(pool, books, cents(550)).await;
    let mug = add_product(pool, mugs, cents(333)).await;

    let buyer = Identity {
        user_id: UserId::new("user_buyer"),
        email: None,
        name: "Buyer".to_owned(),
        image_url: String::new(),
        is_member: false,
    };
    sqlx::query("INSERT INTO app_user (id, email) VALUES ($1, 'buyer@gocart.test')")
        .bind(&buyer.user_id)
        .execute(pool)
        .await
        .expect("insert buyer");

    let address_id = AddressId::generate();
    sqlx::query(
        r"
        INSERT INTO address (id, user_id, name, email, street, city, state, zip, country, phone)
        VALUES ($1, $2, 'Buyer', 'buyer@gocart.test', '2 Elm St', 'Springfield', 'IL',
                '62701', 'US', '555-0101')
        ",
    )
    .bind(address_id)
    .bind(&buyer.user_id)
    .execute(pool)
    .await
    .expect("insert address");

    sqlx::query(
        r#"INSERT INTO cart (user_id, items, version) VALUES ($1, '{"saved": 1}'::jsonb, 3)"#,
    )
    .bind(&buyer.user_id)
    .execute(pool)
    .await
    .expect("insert cart");

    Marketplace {
        buyer,
        address_id,
        books,
        mugs,
        novel,
        atlas,
        mug,
    }
}

fn request(m: &Marketplace, payment_method: PaymentMethod, coupon: Option<&str>) -> CheckoutRequest {
    let line = |product_id, quantity| LineItemRequest {
        product_id,
        quantity,
    };
    CheckoutRequest {
        address_id: m.address_id,
        items: vec![line(m.novel, 2), line(m.mug, 1), line(m.atlas, 1)],
        payment_method,
        coupon_code: coupon.map(|c| CouponCode::parse(c).expect("valid code")),
    }
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .expect("count orders")
}

async fn cart_version(pool: &PgPool, user_id: &UserId) -> i64 {
    sqlx::query_scalar("SELECT version FROM cart WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("cart version")
}

// =============================================================================
// Cash on Delivery
// =============================================================================

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_cod_checkout_writes_one_order_per_store(pool: PgPool) {
    let m = marketplace(&pool).await;
    add_coupon(&pool, "TENOFF", 10).await;
    let gateway = RecordingGateway::default();

    let outcome = place_order_with(
        &pool,
        &gateway,
        &settings(),
        &m.buyer,
        request(&m, PaymentMethod::Cod, Some("tenoff")),
    )
    .await
    .expect("checkout succeeds");

    let CheckoutOutcome::Placed { order_ids } = outcome else {
        panic!("cash on delivery should not redirect");
    };
    assert_eq!(order_ids.len(), 2);
    assert_eq!(order_count(&pool).await, 2);
    assert!(gateway.created().is_empty());

    let rows: Vec<(StoreId, Decimal, bool, Option<String>)> = sqlx::query_as(
        r"
        SELECT store_id, total, is_coupon_used, coupon ->> 'code'
        FROM orders
        ORDER BY total DESC
        ",
    )
    .fetch_all(&pool)
    .await
    .expect("orders");
    assert_eq!(
        rows,
        vec![
            (m.books, cents(2795), true, Some("TENOFF".to_owned())),
            (m.mugs, cents(300), true, Some("TENOFF".to_owned())),
        ]
    );

    let discounts: Vec<Decimal> =
        sqlx::query_scalar("SELECT DISTINCT discount_percent FROM order_item")
            .fetch_all(&pool)
            .await
            .expect("items");
    assert_eq!(discounts, vec![Decimal::from(10)]);

    // Cleared in the same transaction
    let items: serde_json::Value = sqlx::query_scalar("SELECT items FROM cart WHERE user_id = $1")
        .bind(&m.buyer.user_id)
        .fetch_one(&pool)
        .await
        .expect("cart");
    assert_eq!(items, serde_json::json!({}));
    assert_eq!(cart_version(&pool, &m.buyer.user_id).await, 4);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_unknown_address_writes_nothing(pool: PgPool) {
    let m = marketplace(&pool).await;
    let gateway = RecordingGateway::default();
    let mut req = request(&m, PaymentMethod::Cod, None);
    req.address_id = AddressId::generate();

    let result = place_order_with(&pool, &gateway, &settings(), &m.buyer, req).await;

    assert!(matches!(result, Err(CheckoutError::AddressNotFound)));
    assert_eq!(order_count(&pool).await, 0);
    assert_eq!(cart_version(&pool, &m.buyer.user_id).await, 3);
}

// =============================================================================
// Card Payment
// =============================================================================

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_card_checkout_opens_one_session(pool: PgPool) {
    let m = marketplace(&pool).await;
    let gateway = RecordingGateway::default();

    let outcome = place_order_with(
        &pool,
        &gateway,
        &settings(),
        &m.buyer,
        request(&m, PaymentMethod::Stripe, None),
    )
    .await
    .expect("checkout succeeds");

    let CheckoutOutcome::Redirect { url, order_ids } = outcome else {
        panic!("card payment should redirect");
    };
    assert_eq!(url, SESSION_URL);
    // 25.50 + 5.00 shipping + 3.33
    assert_eq!(gateway.created(), vec![(3383, order_ids)]);

    let unpaid: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE NOT is_paid")
        .fetch_one(&pool)
        .await
        .expect("count unpaid");
    assert_eq!(unpaid, 2);
    assert_eq!(cart_version(&pool, &m.buyer.user_id).await, 3);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_declined_session_rolls_back_every_order(pool: PgPool) {
    let m = marketplace(&pool).await;
    let gateway = RecordingGateway::declining();

    let result = place_order_with(
        &pool,
        &gateway,
        &settings(),
        &m.buyer,
        request(&m, PaymentMethod::Stripe, None),
    )
    .await;

    assert!(matches!(result, Err(CheckoutError::Payment(_))));
    let created = gateway.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created.first().map(|(_, ids)| ids.len()), Some(2));

    assert_eq!(order_count(&pool).await, 0);
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_item")
        .fetch_one(&pool)
        .await
        .expect("count items");
    assert_eq!(items, 0);
    assert_eq!(cart_version(&pool, &m.buyer.user_id).await, 3);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_failed_commit_expires_session(pool: PgPool) {
    let m = marketplace(&pool).await;
    let gateway = RecordingGateway::default();

    // Fails only when the transaction commits
    sqlx::query(
        r"
        CREATE FUNCTION reject_order() RETURNS trigger LANGUAGE plpgsql AS $$
        BEGIN
            RAISE EXCEPTION 'order rejected at commit';
        END
        $$
        ",
    )
    .execute(&pool)
    .await
    .expect("create function");
    sqlx::query(
        r"
        CREATE CONSTRAINT TRIGGER reject_order_at_commit
        AFTER INSERT ON orders
        DEFERRABLE INITIALLY DEFERRED
        FOR EACH ROW EXECUTE FUNCTION reject_order()
        ",
    )
    .execute(&pool)
    .await
    .expect("create trigger");

    let result = place_order_with(
        &pool,
        &gateway,
        &settings(),
        &m.buyer,
        request(&m, PaymentMethod::Stripe, None),
    )
    .await;

    assert!(matches!(result, Err(CheckoutError::Repository(_))));
    assert_eq!(gateway.expired(), vec![SESSION_ID.to_owned()]);
    assert_eq!(order_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../storefront/migrations")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_fully_discounted_card_checkout_is_settled(pool: PgPool) {
    let mut m = marketplace(&pool).await;
    m.buyer.is_member = true;
    add_coupon(&pool, "FREE", 100).await;
    let gateway = RecordingGateway::default();

    let outcome = place_order_with(
        &pool,
        &gateway,
        &settings(),
        &m.buyer,
        request(&m, PaymentMethod::Stripe, Some("FREE")),
    )
    .await
    .expect("checkout succeeds");

    assert!(matches!(outcome, CheckoutOutcome::Placed { .. }));
    assert!(gateway.created().is_empty());

    let paid: Vec<(bool, Decimal)> = sqlx::query_as("SELECT is_paid, total FROM orders")
        .fetch_all(&pool)
        .await
        .expect("orders");
    assert_eq!(paid.len(), 2);
    assert!(paid.iter().all(|&(is_paid, total)| is_paid && total.is_zero()));
    assert_eq!(cart_version(&pool, &m.buyer.user_id).await, 4);
}
