//! Product rating endpoints.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use gocart_core::{OrderId, ProductId};

use crate::db::{OrderRepository, RatingRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::NewRating;
use crate::state::AppState;

/// Shortest review accepted, in characters.
const MIN_REVIEW_CHARS: usize = 5;

/// `POST /api/rating` body.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateRatingBody {
    pub product_id: ProductId,
    pub order_id: OrderId,
    pub rating: i32,
    pub review: String,
}

impl TryFrom<CreateRatingBody> for NewRating {
    type Error = AppError;

    fn try_from(body: CreateRatingBody) -> Result<Self> {
        if !(1..=5).contains(&body.rating) {
            return Err(AppError::BadRequest(
                "rating must be between 1 and 5".to_string(),
            ));
        }
        let review = body.review.trim();
        if review.chars().count() < MIN_REVIEW_CHARS {
            return Err(AppError::BadRequest(format!(
                "review must be at least {MIN_REVIEW_CHARS} characters"
            )));
        }
        Ok(Self {
            product_id: body.product_id,
            order_id: body.order_id,
            rating: body.rating,
            review: review.to_owned(),
        })
    }
}

/// Rate a product from one of the caller's orders.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
    ApiJson(body): ApiJson<CreateRatingBody>,
) -> Result<Json<Value>> {
    let rating = NewRating::try_from(body)?;

    let ordered = OrderRepository::new(state.pool())
        .contains_product(&identity.user_id, rating.order_id, rating.product_id)
        .await?;
    if !ordered {
        return Err(AppError::NotFound("Product not found in order".to_string()));
    }

    let created = RatingRepository::new(state.pool())
        .create(&identity.user_id, &rating)
        .await?;
    Ok(Json(json!({
        "rating": created,
        "message": "Rating added successfully",
    })))
}

/// Ratings the caller has given.
#[instrument(skip_all, fields(user_id = %identity.user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(identity): RequireAuth,
) -> Result<Json<Value>> {
    let ratings = RatingRepository::new(state.pool())
        .list_for_user(&identity.user_id)
        .await?;
    Ok(Json(json!({ "ratings": ratings })))
}
