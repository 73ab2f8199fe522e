//! `/api/orders`.

use crate::WebResult;
use crate::extractors::{Admin, Authenticated};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use storefront_auth::authorize::require_self_or_admin;
use storefront_core::domain::order::{LineItem, Order, OrderView};
use storefront_core::{OrderId, UserId};

/// Body of `POST /api/orders/place-order`.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Buyer; honoured only for admins, everyone else buys for themselves
    #[serde(default)]
    pub user: Option<UserId>,
    /// Requested lines
    #[serde(default)]
    pub products: Vec<LineItem>,
}

/// Body of `PUT /api/orders/:id/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New status name
    pub status: String,
}

/// `POST /api/orders/place-order`
pub async fn place_order(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(request): Json<PlaceOrderRequest>,
) -> WebResult<(StatusCode, Json<Order>)> {
    let buyer = match request.user {
        Some(user) if actor.is_admin() => user,
        _ => actor.user_id,
    };
    let order = state.orders.place_order(buyer, request.products).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders` (admin)
pub async fn list_orders(
    State(state): State<AppState>,
    _admin: Admin,
) -> WebResult<Json<Vec<OrderView>>> {
    Ok(Json(state.orders.list_all().await?))
}

/// `GET /api/orders/user/:userId` (self or admin)
pub async fn list_user_orders(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(user_id): Path<UserId>,
) -> WebResult<Json<Vec<OrderView>>> {
    require_self_or_admin(&actor, user_id)?;
    Ok(Json(state.orders.list_for_user(user_id).await?))
}

/// `PUT /api/orders/:id/status` (admin)
pub async fn update_status(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> WebResult<Json<Order>> {
    Ok(Json(state.orders.update_status(id, &request.status).await?))
}
