//! Address repository.

use sqlx::PgPool;

use gocart_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, NewAddress};

const ADDRESS_COLUMNS: &str =
    "id, user_id, name, email, street, city, state, zip, country, phone, created_at";

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Save a new address for the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: &UserId,
        address: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let created = sqlx::query_as::<_, Address>(&format!(
            r"
            INSERT INTO address (id, user_id, name, email, street, city, state, zip, country, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(AddressId::generate())
        .bind(user_id)
        .bind(&address.name)
        .bind(&address.email)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .bind(&address.country)
        .bind(&address.phone)
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// All of the user's addresses, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// Load an address only if it belongs to the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_for_user(
        &self,
        user_id: &UserId,
        id: AddressId,
    ) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM address WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }
}
