//! `/api/notifications`.
//!
//! The single path parameter is a user id for listing and a notification id
//! for mark-read and delete.

use super::MessageResponse;
use crate::WebResult;
use crate::extractors::Authenticated;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use storefront_auth::authorize::require_self_or_admin;
use storefront_core::domain::notification::Notification;
use storefront_core::{NotificationId, UserId};

/// `GET /api/notifications/:userId` (self or admin)
pub async fn list_notifications(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(user_id): Path<UserId>,
) -> WebResult<Json<Vec<Notification>>> {
    require_self_or_admin(&actor, user_id)?;
    Ok(Json(state.notifications.list_for_user(user_id).await?))
}

/// `PATCH /api/notifications/:id/mark-read` (recipient or admin)
pub async fn mark_read(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<NotificationId>,
) -> WebResult<Json<Notification>> {
    Ok(Json(state.notifications.mark_read(actor, id).await?))
}

/// `DELETE /api/notifications/:id` (recipient or admin)
pub async fn delete_notification(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(id): Path<NotificationId>,
) -> WebResult<Json<MessageResponse>> {
    state.notifications.delete(actor, id).await?;
    Ok(Json(MessageResponse::new("Notification deleted successfully")))
}
