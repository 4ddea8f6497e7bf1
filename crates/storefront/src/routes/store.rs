//! Seller store applications.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};
use url::Url;

use gocart_core::Email;

use crate::db::{StoreRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::NewStore;
use crate::state::AppState;

/// Longest store username.
const MAX_USERNAME_LEN: usize = 32;

/// `POST /api/store/create` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateStoreBody {
    pub name: String,
    pub username: String,
    pub description: String,
    pub email: String,
    pub contact: String,
    pub address: String,
    /// URL of the logo, already uploaded to the image host by the client.
    pub logo: String,
}

/// Lower-case a username and check it is URL safe.
fn normalize_username(raw: &str) -> Result<String> {
    let username = raw.trim().to_ascii_lowercase();
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(
            "username may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(username)
}

impl TryFrom<CreateStoreBody> for NewStore {
    type Error = AppError;

    fn try_from(body: CreateStoreBody) -> Result<Self> {
        let required = |field: &str, value: &str| -> Result<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(AppError::BadRequest(format!("{field} is required")));
            }
            Ok(value.to_owned())
        };

        let logo = Url::parse(body.logo.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .ok_or_else(|| AppError::BadRequest("logo must be an http(s) URL".to_string()))?;

        Ok(Self {
            name: required("name", &body.name)?,
            username: normalize_username(&body.username)?,
            description: required("description", &body.description)?,
            email: Email::parse(&body.email)
                .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?,
            contact: required("contact", &body.contact)?,
            address: required("address", &body.address)?,
            logo: logo.to_string(),
        })
    }
}

/// Apply to open a store.
///
/// A caller who already applied gets their current status back instead.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    ApiJson(body): ApiJson<CreateStoreBody>,
) -> Result<Json<Value>> {
    let stores = StoreRepository::new(state.pool());
    if let Some(existing) = stores.find_by_user(&identity.user_id).await? {
        return Ok(Json(json!({ "status": existing.status })));
    }

    let store = NewStore::try_from(body)?;
    if stores.username_taken(&store.username).await? {
        return Err(AppError::BadRequest("username already taken".to_string()));
    }

    UserRepository::new(state.pool()).ensure(&identity).await?;
    let created = stores.create(&identity.user_id, &store).await?;
    info!(store_id = %created.id, username = %created.username, "Store application submitted");

    Ok(Json(json!({ "message": "applied, waiting for approval" })))
}

/// Status of the caller's store application.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn status(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Value>> {
    let store = StoreRepository::new(state.pool())
        .find_by_user(&identity.user_id)
        .await?;
    let status = store.map_or_else(
        || json!("not registered"),
        |store| json!(store.status),
    );
    Ok(Json(json!({ "status": status })))
}
