//! `/api/users`: registration, login and profile management.

use super::MessageResponse;
use crate::WebResult;
use crate::extractors::{Admin, Authenticated};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use storefront_auth::authorize::require_self_or_admin;
use storefront_auth::{LoginRequest, LoginResponse, RegisterRequest};
use storefront_core::UserId;
use storefront_core::domain::account::{UserPatch, UserView};

/// `POST /api/users/create-user`
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> WebResult<(StatusCode, Json<UserView>)> {
    let user = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/users/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> WebResult<Json<LoginResponse>> {
    Ok(Json(state.auth.login(request).await?))
}

/// `GET /api/users/view-users` (admin)
pub async fn list_users(
    State(state): State<AppState>,
    _admin: Admin,
) -> WebResult<Json<Vec<UserView>>> {
    Ok(Json(state.accounts.list_users().await?))
}

/// `GET /api/users/view-customers`
pub async fn list_customers(
    State(state): State<AppState>,
    _caller: Authenticated,
) -> WebResult<Json<Vec<UserView>>> {
    Ok(Json(state.accounts.list_customers().await?))
}

/// `GET /api/users/view-user/:id` (self or admin)
pub async fn get_user(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<UserId>,
) -> WebResult<Json<UserView>> {
    require_self_or_admin(&actor, id)?;
    Ok(Json(state.accounts.get_user(id).await?))
}

/// `PUT /api/users/update-user/:id` (self or admin)
pub async fn update_user(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<UserId>,
    Json(patch): Json<UserPatch>,
) -> WebResult<Json<UserView>> {
    require_self_or_admin(&actor, id)?;
    Ok(Json(state.accounts.update_user(id, patch).await?))
}

/// `DELETE /api/users/delete-user/:id` (self or admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<UserId>,
) -> WebResult<Json<MessageResponse>> {
    require_self_or_admin(&actor, id)?;
    state.accounts.delete_user(id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
