//! In-app notifications.

use crate::types::{NotificationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message shown to a user. Created only as a side effect of other
/// operations; afterwards only the read flag changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification id
    pub id: NotificationId,
    /// Recipient profile
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Short title
    pub title: String,
    /// Body text
    pub message: String,
    /// Whether the recipient has seen it
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unread notification.
    #[must_use]
    pub fn unread(
        user_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: now,
        }
    }
}
