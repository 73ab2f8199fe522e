//! `/api/cart/:userId` (self or admin).

use super::MessageResponse;
use crate::WebResult;
use crate::extractors::Authenticated;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use storefront_auth::authorize::require_self_or_admin;
use storefront_core::domain::cart::CartView;
use storefront_core::{ProductId, UserId};

/// Body of `POST /api/cart/:userId`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Product to add
    pub product_id: ProductId,
    /// Units to add
    pub quantity: u32,
}

/// Body of `PUT /api/cart/:userId/:productId`.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    /// New line quantity
    pub quantity: u32,
}

/// `GET /api/cart/:userId`
pub async fn get_cart(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(user_id): Path<UserId>,
) -> WebResult<Json<CartView>> {
    require_self_or_admin(&actor, user_id)?;
    Ok(Json(state.carts.get(user_id).await?))
}

/// `POST /api/cart/:userId`
pub async fn add_item(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(user_id): Path<UserId>,
    Json(request): Json<AddItemRequest>,
) -> WebResult<Json<CartView>> {
    require_self_or_admin(&actor, user_id)?;
    let cart = state
        .carts
        .add_item(user_id, request.product_id, request.quantity)
        .await?;
    Ok(Json(cart))
}

/// `PUT /api/cart/:userId/:productId`
pub async fn update_quantity(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
    Json(request): Json<QuantityRequest>,
) -> WebResult<Json<CartView>> {
    require_self_or_admin(&actor, user_id)?;
    let cart = state
        .carts
        .update_quantity(user_id, product_id, request.quantity)
        .await?;
    Ok(Json(cart))
}

/// `DELETE /api/cart/:userId/:productId`
pub async fn remove_item(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path((user_id, product_id)): Path<(UserId, ProductId)>,
) -> WebResult<Json<CartView>> {
    require_self_or_admin(&actor, user_id)?;
    Ok(Json(state.carts.remove_item(user_id, product_id).await?))
}

/// `DELETE /api/cart/:userId`
pub async fn clear_cart(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(user_id): Path<UserId>,
) -> WebResult<Json<MessageResponse>> {
    require_self_or_admin(&actor, user_id)?;
    state.carts.clear(user_id).await?;
    Ok(Json(MessageResponse::new("Cart cleared")))
}
