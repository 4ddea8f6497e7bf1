//! Shipping address endpoints.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use gocart_core::Email;

use crate::db::{AddressRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::NewAddress;
use crate::state::AppState;

/// Address fields as submitted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddressInput {
    pub name: String,
    pub email: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

/// `POST /api/address` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAddressBody {
    pub address: AddressInput,
}

fn required(field: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

impl TryFrom<AddressInput> for NewAddress {
    type Error = AppError;

    fn try_from(input: AddressInput) -> Result<Self> {
        let email = Email::parse(&input.email)
            .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
        Ok(Self {
            name: required("name", input.name)?,
            email,
            street: required("street", input.street)?,
            city: required("city", input.city)?,
            state: required("state", input.state)?,
            zip: required("zip", input.zip)?,
            country: required("country", input.country)?,
            phone: required("phone", input.phone)?,
        })
    }
}

/// Save a new address.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    ApiJson(body): ApiJson<CreateAddressBody>,
) -> Result<Json<Value>> {
    let address = NewAddress::try_from(body.address)?;
    UserRepository::new(state.pool()).ensure(&identity).await?;

    let created = AddressRepository::new(state.pool())
        .create(&identity.user_id, &address)
        .await?;
    Ok(Json(json!({
        "newAddress": created,
        "message": "Address added successfully",
    })))
}

/// The caller's addresses.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Value>> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(&identity.user_id)
        .await?;
    Ok(Json(json!({ "addresses": addresses })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            street: "12 Analytical Way".into(),
            city: "London".into(),
            state: "LDN".into(),
            zip: "N1 9GU".into(),
            country: "UK".into(),
            phone: "+44 20 7946 0000".into(),
        }
    }

    #[test]
    fn test_valid_address() {
        let address = NewAddress::try_from(input()).unwrap();
        assert_eq!(address.email.as_str(), "ada@example.com");
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut bad = input();
        bad.city = "   ".into();
        let err = NewAddress::try_from(bad).unwrap_err();
        assert_eq!(err.client_message(), "city is required");
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut bad = input();
        bad.email = "not-an-email".into();
        assert!(NewAddress::try_from(bad).is_err());
    }

    #[test]
    fn test_missing_field_rejected() {
        assert!(
            serde_json::from_str::<CreateAddressBody>(r#"{"address":{"name":"A"}}"#).is_err()
        );
    }
}
