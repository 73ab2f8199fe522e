//! `/api/sidebar`.

use super::MessageResponse;
use crate::WebResult;
use crate::extractors::{Admin, Authenticated};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use storefront_core::MenuId;
use storefront_core::domain::sidebar::{NewSidebarMenu, SidebarMenu, SidebarMenuPatch};

/// `POST /api/sidebar` (admin)
pub async fn create_menu(
    State(state): State<AppState>,
    _admin: Admin,
    Json(input): Json<NewSidebarMenu>,
) -> WebResult<(StatusCode, Json<SidebarMenu>)> {
    let menu = state.sidebar.create(input).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

/// `GET /api/sidebar`: menus visible to the caller's role.
pub async fn list_menus(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
) -> WebResult<Json<Vec<SidebarMenu>>> {
    Ok(Json(state.sidebar.list_for_role(actor.role).await?))
}

/// `PATCH /api/sidebar/:id` (admin)
pub async fn update_menu(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<MenuId>,
    Json(patch): Json<SidebarMenuPatch>,
) -> WebResult<Json<SidebarMenu>> {
    Ok(Json(state.sidebar.update(id, patch).await?))
}

/// `DELETE /api/sidebar/:id` (admin)
pub async fn delete_menu(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<MenuId>,
) -> WebResult<Json<MessageResponse>> {
    state.sidebar.delete(id).await?;
    Ok(Json(MessageResponse::new("Menu deleted successfully")))
}
