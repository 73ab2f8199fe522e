//! Mailer that records instead of sending.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use storefront_core::mailer::{EmailMessage, MailError, Mailer};

/// Captures every email it is asked to send.
///
/// Can be told to fail the next `n` sends with a transient delivery error,
/// or to fail every send permanently.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    attempts: AtomicUsize,
    transient_failures: AtomicUsize,
    permanent_failure: bool,
}

impl RecordingMailer {
    /// Create a mailer that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the first `n` sends with [`MailError::Delivery`].
    #[must_use]
    pub fn failing_times(n: usize) -> Self {
        Self {
            transient_failures: AtomicUsize::new(n),
            ..Self::default()
        }
    }

    /// Fail every send with [`MailError::InvalidAddress`].
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            permanent_failure: true,
            ..Self::default()
        }
    }

    /// Emails delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every call to `send`, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.permanent_failure {
            return Err(MailError::InvalidAddress(email.to.clone()));
        }
        let remaining = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if remaining.is_ok() {
            return Err(MailError::Delivery("simulated outage".to_string()));
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email.clone());
        Ok(())
    }
}
