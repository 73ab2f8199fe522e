//! `/api/ratings`.

use crate::WebResult;
use crate::extractors::Authenticated;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use storefront_core::ProductId;
use storefront_core::domain::rating::{NewRating, Rating, RatingView};

/// `POST /api/ratings`; the author is the caller.
pub async fn add_rating(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(input): Json<NewRating>,
) -> WebResult<(StatusCode, Json<Rating>)> {
    let rating = state.ratings.add_rating(actor.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

/// `GET /api/ratings/product/:productId`
pub async fn list_product_ratings(
    State(state): State<AppState>,
    _caller: Authenticated,
    Path(product_id): Path<ProductId>,
) -> WebResult<Json<Vec<RatingView>>> {
    Ok(Json(state.ratings.list_for_product(product_id).await?))
}
