//! Console mailer for development.

use async_trait::async_trait;
use storefront_core::mailer::{EmailMessage, MailError, Mailer};
use tracing::info;

/// Logs emails instead of sending them.
///
/// Used when no SMTP credentials are configured.
///
/// # Examples
///
/// ```ignore
/// use storefront_auth::providers::ConsoleMailer;
///
/// let mailer = ConsoleMailer::new();
/// mailer.send(&welcome).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Create a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), MailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            "📧 Email (Development Mode)"
        );
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║ To: {:<57}║", email.to);
        println!("║ Subject: {:<52}║", email.subject);
        println!("╠══════════════════════════════════════════════════════════════╣");
        for line in email.text.lines() {
            println!("║ {line:<61}║");
        }
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        Ok(())
    }
}
