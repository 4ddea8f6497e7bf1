//! Seller tools: store check, AI-assisted listings and product management.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};
use url::Url;

use gocart_core::round_currency;
use gocart_storefront::db::ProductRepository;
use gocart_storefront::middleware::RequireAuth;
use gocart_storefront::models::NewProduct;

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{RequireSeller, selling_store};
use crate::services::{ListingDraft, ListingImage, ListingService};
use crate::state::AppState;

/// Most images a product may carry.
const MAX_IMAGES: usize = 8;

/// `POST /api/store/ai` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftListingBody {
    #[serde(default)]
    pub base64_image: String,
    #[serde(default)]
    pub mime_type: String,
}

/// `POST /api/store/product` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProductBody {
    pub name: String,
    pub description: String,
    pub mrp: Decimal,
    pub price: Decimal,
    pub images: Vec<String>,
    pub category: String,
}

fn positive_amount(field: &str, amount: Decimal) -> Result<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest(format!("{field} must be greater than 0")));
    }
    if round_currency(amount) != amount {
        return Err(AppError::BadRequest(format!(
            "{field} may have at most 2 decimal places"
        )));
    }
    Ok(amount)
}

impl TryFrom<CreateProductBody> for NewProduct {
    type Error = AppError;

    fn try_from(body: CreateProductBody) -> Result<Self> {
        let required = |field: &str, value: &str| -> Result<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(AppError::BadRequest(format!("{field} is required")));
            }
            Ok(value.to_owned())
        };

        let mrp = positive_amount("mrp", body.mrp)?;
        let price = positive_amount("price", body.price)?;
        if price > mrp {
            return Err(AppError::BadRequest(
                "price must not exceed mrp".to_string(),
            ));
        }

        if body.images.is_empty() || body.images.len() > MAX_IMAGES {
            return Err(AppError::BadRequest(format!(
                "between 1 and {MAX_IMAGES} images are required"
            )));
        }
        let images = body
            .images
            .iter()
            .map(|raw| {
                Url::parse(raw.trim())
                    .ok()
                    .filter(|url| matches!(url.scheme(), "http" | "https"))
                    .map(String::from)
                    .ok_or_else(|| AppError::BadRequest("images must be http(s) URLs".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name: required("name", &body.name)?,
            description: required("description", &body.description)?,
            mrp,
            price,
            images,
            category: required("category", &body.category)?,
        })
    }
}

/// Whether the caller may sell, with their store if so.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn is_seller(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Value>> {
    let store = selling_store(&state, &identity).await?;
    Ok(Json(json!({
        "isSeller": store.is_some(),
        "storeInfo": store,
    })))
}

/// Draft a product name and description from a photo.
#[instrument(skip_all, fields(store_id = %seller.store.id))]
pub async fn draft_listing(
    State(state): State<AppState>,
    seller: RequireSeller,
    ApiJson(body): ApiJson<DraftListingBody>,
) -> Result<Json<ListingDraft>> {
    let image = ListingImage::parse(&body.base64_image, &body.mime_type)?;
    let draft = ListingService::new(state.claude()).draft(image).await?;
    Ok(Json(draft))
}

/// Add a product to the caller's store.
#[instrument(skip_all, fields(store_id = %seller.store.id))]
pub async fn create_product(
    State(state): State<AppState>,
    seller: RequireSeller,
    ApiJson(body): ApiJson<CreateProductBody>,
) -> Result<Json<Value>> {
    let product = NewProduct::try_from(body)?;
    let created = ProductRepository::new(state.pool())
        .create(seller.store.id, &product)
        .await?;

    info!(product_id = %created.id, price = %created.price, "Product created");
    Ok(Json(json!({
        "message": "Product added successfully",
        "product": created,
    })))
}

/// Products of the caller's store, newest first.
#[instrument(skip_all, fields(store_id = %seller.store.id))]
pub async fn list_products(
    State(state): State<AppState>,
    seller: RequireSeller,
) -> Result<Json<Value>> {
    let products = ProductRepository::new(state.pool())
        .list_for_store(seller.store.id)
        .await?;
    Ok(Json(json!({ "products": products })))
}
