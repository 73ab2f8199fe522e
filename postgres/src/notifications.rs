//! In-app notifications.

use crate::{PostgresStore, db_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storefront_core::domain::notification::Notification;
use storefront_core::stores::{NotificationStore, StoreResult};
use storefront_core::{NotificationId, UserId};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            title: row.title,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

const RETURNING: &str = "RETURNING id, user_id, title, message, read, created_at";

#[async_trait]
impl NotificationStore for PostgresStore {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, title, message, read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(notification.id.as_uuid())
        .bind(notification.user_id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("insert notification"))?;
        Ok(())
    }

    async fn notifications_for_user(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        Ok(sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, title, message, read, created_at FROM notifications
             WHERE user_id = $1
             ORDER BY created_at DESC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("list notifications"))?
        .into_iter()
        .map(Notification::from)
        .collect())
    }

    async fn get_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        Ok(sqlx::query_as::<_, NotificationRow>(
            "SELECT id, user_id, title, message, read, created_at FROM notifications WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("load notification"))?
        .map(Notification::from))
    }

    async fn mark_read(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        Ok(sqlx::query_as::<_, NotificationRow>(&format!(
            "UPDATE notifications SET read = TRUE WHERE id = $1 {RETURNING}"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("mark notification read"))?
        .map(Notification::from))
    }

    async fn delete_notification(&self, id: NotificationId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete notification"))?;
        Ok(result.rows_affected() > 0)
    }
}
