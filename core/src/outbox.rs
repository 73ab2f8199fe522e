//! Side-effect outbox and dispatcher.
//!
//! Services enqueue [`Effect`]s after their main write has committed. The
//! production [`ChannelOutbox`] pushes them onto a bounded channel drained by
//! an [`EffectDispatcher`] task, which delivers each effect with retry and
//! logs (never propagates) final failures. Delivery problems therefore never
//! roll back or fail the operation that produced the effect, and a full queue
//! drops the effect rather than stalling the request.
//!
//! ```text
//! service ──enqueue──▶ ChannelOutbox ──mpsc──▶ EffectDispatcher ──▶ NotificationStore
//!                                                                └─▶ Mailer
//! ```

use crate::domain::notification::Notification;
use crate::effects::Effect;
use crate::environment::Clock;
use crate::error::StoreError;
use crate::mailer::{MailError, Mailer};
use crate::metrics::{EFFECTS_DISPATCHED_TOTAL, EFFECTS_DROPPED_TOTAL, EFFECTS_FAILED_TOTAL};
use crate::retry::{RetryPolicy, retry_if};
use crate::stores::NotificationStore;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

/// Accepts side effects for asynchronous delivery.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Queue effects for delivery. Never fails; problems are logged.
    async fn enqueue(&self, effects: Vec<Effect>);
}

/// Failure of a single effect delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Writing the notification failed.
    #[error("notification store: {0}")]
    Store(#[from] StoreError),

    /// Sending the email failed.
    #[error("mailer: {0}")]
    Mail(#[from] MailError),
}

impl DeliveryError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Database(_)) | Self::Mail(MailError::Delivery(_))
        )
    }
}

/// Performs effects against the notification store and the mailer.
#[derive(Clone)]
pub struct EffectExecutor {
    notifications: Arc<dyn NotificationStore>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
}

impl EffectExecutor {
    /// Create a new executor.
    #[must_use]
    pub fn new(
        notifications: Arc<dyn NotificationStore>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            notifications,
            mailer,
            clock,
            policy,
        }
    }

    /// Deliver one effect with retry.
    ///
    /// # Errors
    ///
    /// Returns the last [`DeliveryError`] once retries are exhausted or a
    /// permanent failure occurs.
    pub async fn deliver(&self, effect: &Effect) -> Result<(), DeliveryError> {
        match effect {
            Effect::Notify {
                user_id,
                title,
                message,
            } => {
                let notification =
                    Notification::unread(*user_id, title.as_str(), message.as_str(), self.clock.now());
                let notification = &notification;
                let store = &self.notifications;
                retry_if(
                    &self.policy,
                    "insert_notification",
                    || async move {
                        store
                            .insert_notification(notification.clone())
                            .await
                            .map_err(DeliveryError::from)
                    },
                    DeliveryError::is_transient,
                )
                .await
            }
            Effect::Email(email) => {
                let mailer = &self.mailer;
                retry_if(
                    &self.policy,
                    "send_email",
                    || async move { mailer.send(email).await.map_err(DeliveryError::from) },
                    DeliveryError::is_transient,
                )
                .await
            }
        }
    }

    /// Deliver one effect, recording the outcome in logs and metrics.
    pub async fn deliver_logged(&self, effect: &Effect) {
        match self.deliver(effect).await {
            Ok(()) => {
                metrics::counter!(EFFECTS_DISPATCHED_TOTAL, "kind" => effect.kind()).increment(1);
                tracing::debug!(kind = effect.kind(), "Effect delivered");
            }
            Err(err) => {
                metrics::counter!(EFFECTS_FAILED_TOTAL, "kind" => effect.kind()).increment(1);
                tracing::error!(kind = effect.kind(), error = %err, "Effect delivery failed");
            }
        }
    }
}

// ============================================================================
// Channel outbox (production)
// ============================================================================

/// Outbox backed by a bounded channel.
#[derive(Clone)]
pub struct ChannelOutbox {
    sender: mpsc::Sender<Effect>,
}

#[async_trait]
impl Outbox for ChannelOutbox {
    /// Never waits for queue space: when the dispatcher is behind and the
    /// queue is full, the effect is dropped and counted.
    async fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let kind = effect.kind();
            match self.sender.try_send(effect) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    metrics::counter!(EFFECTS_DROPPED_TOTAL, "kind" => kind).increment(1);
                    tracing::warn!(kind, "Effect queue is full; effect dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    metrics::counter!(EFFECTS_FAILED_TOTAL, "kind" => kind).increment(1);
                    tracing::error!(kind, "Effect dispatcher has stopped; effect dropped");
                }
            }
        }
    }
}

/// Background task that drains a [`ChannelOutbox`].
pub struct EffectDispatcher {
    receiver: mpsc::Receiver<Effect>,
    executor: EffectExecutor,
}

impl EffectDispatcher {
    /// Create an outbox/dispatcher pair with the given queue capacity.
    #[must_use]
    pub fn channel(executor: EffectExecutor, capacity: usize) -> (ChannelOutbox, Self) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (ChannelOutbox { sender }, Self { receiver, executor })
    }

    /// Spawn the dispatcher onto the tokio runtime.
    ///
    /// The task finishes once every [`ChannelOutbox`] clone has been dropped
    /// and the queue is drained.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Deliver effects until the channel closes.
    pub async fn run(mut self) {
        tracing::info!("Effect dispatcher started");
        while let Some(effect) = self.receiver.recv().await {
            self.executor.deliver_logged(&effect).await;
        }
        tracing::info!("Effect dispatcher drained and stopped");
    }
}

// ============================================================================
// Inline outbox (tests, tools)
// ============================================================================

/// Outbox that delivers effects before `enqueue` returns.
#[derive(Clone)]
pub struct InlineOutbox {
    executor: EffectExecutor,
}

impl InlineOutbox {
    /// Create a new inline outbox.
    #[must_use]
    pub const fn new(executor: EffectExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Outbox for InlineOutbox {
    async fn enqueue(&self, effects: Vec<Effect>) {
        for effect in &effects {
            self.executor.deliver_logged(effect).await;
        }
    }
}
