//! Order repository.
//!
//! Orders are written only by checkout and by payment confirmation. Both run
//! inside a caller-owned transaction, so those methods take a connection.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use gocart_core::checkout::{CouponSnapshot, OrderDraft};
use gocart_core::{AddressId, OrderId, PaymentMethod, ProductId, UserId};

use super::{ProductRepository, RepositoryError};
use crate::models::{Address, Order, OrderDetails, OrderItem, OrderItemDetails};

const ORDER_COLUMNS: &str = "id, user_id, store_id, address_id, total, status, payment_method, \
                             is_paid, is_coupon_used, coupon, created_at, updated_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of orders the user has ever placed, in any state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: &UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Persist one priced store order and its items.
    ///
    /// Item prices are the checkout snapshot from `draft`; each item also
    /// records the coupon percentage that applied to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn insert_draft(
        conn: &mut PgConnection,
        user_id: &UserId,
        address_id: AddressId,
        payment_method: PaymentMethod,
        draft: &OrderDraft,
        coupon: Option<&CouponSnapshot>,
    ) -> Result<OrderId, RepositoryError> {
        let order_id = OrderId::generate();

        sqlx::query(
            r"
            INSERT INTO orders (id, user_id, store_id, address_id, total, payment_method,
                                is_coupon_used, coupon)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .bind(draft.store_id)
        .bind(address_id)
        .bind(draft.total)
        .bind(payment_method)
        .bind(coupon.is_some())
        .bind(coupon.map(Json))
        .execute(&mut *conn)
        .await?;

        let mut product_ids = Vec::with_capacity(draft.lines.len());
        let mut quantities = Vec::with_capacity(draft.lines.len());
        let mut prices = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            product_ids.push(line.product_id);
            quantities.push(i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity {} out of range", line.quantity))
            })?);
            prices.push(line.price);
        }
        let discount_percent = coupon.map_or(Decimal::ZERO, |c| c.discount);

        sqlx::query(
            r"
            INSERT INTO order_item (order_id, product_id, quantity, price, discount_percent)
            SELECT $1, item.product_id, item.quantity, item.price, $5
            FROM UNNEST($2::uuid[], $3::int4[], $4::numeric[])
                 AS item (product_id, quantity, price)
            ",
        )
        .bind(order_id)
        .bind(&product_ids)
        .bind(&quantities)
        .bind(&prices)
        .bind(discount_percent)
        .execute(&mut *conn)
        .await?;

        Ok(order_id)
    }

    /// Mark a user's orders paid. Returns how many rows changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_paid(
        conn: &mut PgConnection,
        user_id: &UserId,
        order_ids: &[OrderId],
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET is_paid = true, updated_at = now()
            WHERE id = ANY($1) AND user_id = $2 AND NOT is_paid
            ",
        )
        .bind(order_ids)
        .bind(user_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a user's unpaid orders, e.g. after an abandoned payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_unpaid(
        &self,
        user_id: &UserId,
        order_ids: &[OrderId],
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM orders WHERE id = ANY($1) AND user_id = $2 AND NOT is_paid",
        )
        .bind(order_ids)
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Whether `order_id` belongs to the user and contains `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains_product(
        &self,
        user_id: &UserId,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM order_item oi
                JOIN orders o ON o.id = oi.order_id
                WHERE o.id = $1 AND o.user_id = $2 AND oi.product_id = $3
            )
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// The user's order history, newest first.
    ///
    /// Cash-on-delivery orders are always listed; card orders only once paid,
    /// so abandoned payments never show up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<OrderDetails>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE user_id = $1 AND (payment_method = 'COD' OR is_paid)
            ORDER BY created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
        let address_ids: Vec<AddressId> = orders.iter().map(|o| o.address_id).collect();

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT order_id, product_id, quantity, price, discount_percent
            FROM order_item
            WHERE order_id = ANY($1)
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let product_ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
        let products: HashMap<ProductId, _> = ProductRepository::new(self.pool)
            .find_many(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let addresses: HashMap<AddressId, Address> = sqlx::query_as::<_, Address>(
            r"
            SELECT id, user_id, name, email, street, city, state, zip, country, phone, created_at
            FROM address
            WHERE id = ANY($1)
            ",
        )
        .bind(&address_ids)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

        let mut items_by_order: HashMap<OrderId, Vec<OrderItemDetails>> = HashMap::new();
        for item in items {
            let product = products.get(&item.product_id).cloned();
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItemDetails { item, product });
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderDetails {
                order_items: items_by_order.remove(&order.id).unwrap_or_default(),
                address: addresses.get(&order.address_id).cloned(),
                order,
            })
            .collect())
    }
}
