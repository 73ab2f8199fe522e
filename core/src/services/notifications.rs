//! In-app notifications.

use crate::domain::notification::Notification;
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{Actor, NotificationId, UserId};

/// Notification operations.
#[derive(Clone)]
pub struct NotificationService {
    env: Environment,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Notifications of a user, newest first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Notification>> {
        Ok(self.env.notifications.notifications_for_user(user_id).await?)
    }

    /// Mark a notification as read.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::NotFound`] for an unknown notification
    /// - [`ServiceError::Forbidden`] when `actor` is neither recipient nor admin
    pub async fn mark_read(&self, actor: Actor, id: NotificationId) -> ServiceResult<Notification> {
        self.owned(actor, id).await?;
        self.env
            .notifications
            .mark_read(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification"))
    }

    /// Delete a notification.
    ///
    /// # Errors
    ///
    /// Same as [`Self::mark_read`].
    pub async fn delete(&self, actor: Actor, id: NotificationId) -> ServiceResult<()> {
        self.owned(actor, id).await?;
        if self.env.notifications.delete_notification(id).await? {
            tracing::debug!(notification_id = %id, "Notification deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("Notification"))
        }
    }

    async fn owned(&self, actor: Actor, id: NotificationId) -> ServiceResult<Notification> {
        let Some(notification) = self.env.notifications.get_notification(id).await? else {
            return Err(ServiceError::not_found("Notification"));
        };
        if !actor.can_act_for(notification.user_id) {
            return Err(ServiceError::Forbidden(
                "Forbidden: insufficient permissions".to_string(),
            ));
        }
        Ok(notification)
    }
}
