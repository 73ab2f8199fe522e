//! Outbound email abstraction.
//!
//! Implementations live in `storefront-auth` (SMTP via lettre, console) and
//! `storefront-testing` (recording).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An email ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub text: String,
    /// Optional HTML alternative
    pub html: Option<String>,
}

/// Email delivery failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    /// Sender or recipient address could not be parsed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// The message could not be assembled.
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The transport rejected or failed to deliver the message.
    #[error("Failed to send email: {0}")]
    Delivery(String),
}

/// Email delivery service.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError`] when the message cannot be built or delivered.
    async fn send(&self, email: &EmailMessage) -> Result<(), MailError>;
}
