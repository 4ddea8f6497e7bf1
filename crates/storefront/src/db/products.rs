//! Product repository.

use std::collections::HashMap;

use sqlx::PgPool;

use gocart_core::checkout::PricedProduct;
use gocart_core::{ProductId, StoreId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, store_id, name, description, mrp, price, images, category, \
                               in_stock, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up checkout prices for `ids`.
    ///
    /// Only products of approved, active stores are returned; anything else
    /// is absent from the map, as if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pricing_for(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, PricedProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM product
            WHERE id = ANY($1)
              AND store_id IN (
                  SELECT id FROM store WHERE status = 'approved' AND is_active
              )
            "
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.iter().map(|p| (p.id, p.priced())).collect())
    }

    /// Load products by id, in any store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// List a store's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a product in a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store_id: StoreId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO product (id, store_id, name, description, mrp, price, images, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(ProductId::generate())
        .bind(store_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.mrp)
        .bind(product.price)
        .bind(&product.images)
        .bind(&product.category)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
