//! SMTP mailer implementation using Lettre.

use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use storefront_core::mailer::{EmailMessage, MailError, Mailer};

/// SMTP mailer using Lettre.
///
/// Sends through an implicit-TLS relay (port 465 by default). The blocking
/// transport runs on tokio's blocking pool.
///
/// # Examples
///
/// ```ignore
/// use storefront_auth::{SmtpConfig, providers::SmtpMailer};
///
/// let mailer = SmtpMailer::new(
///     SmtpConfig::new("smtp.gmail.com", "shop@gmail.com", "app_password"),
/// )?;
/// ```
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    /// Create a new SMTP mailer.
    ///
    /// # Errors
    ///
    /// - [`MailError::InvalidAddress`] if the sender address does not parse
    /// - [`MailError::Build`] if the relay cannot be configured
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let from = config
            .from_header()
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid from address: {e}")))?;

        let transport = SmtpTransport::relay(&config.host)
            .map_err(|e| MailError::Build(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &EmailMessage) -> Result<Message, MailError> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress(format!("Invalid to address: {e}")))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());

        let message = match &email.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                html.clone(),
            )),
            None => builder.singlepart(SinglePart::plain(email.text.clone())),
        };
        message.map_err(|e| MailError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &EmailMessage) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let transport = self.transport.clone();

        tokio::task::spawn_blocking(move || {
            transport
                .send(&message)
                .map_err(|e| MailError::Delivery(e.to_string()))
        })
        .await
        .map_err(|e| MailError::Delivery(format!("Email task failed: {e}")))?
        .map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mailer() -> SmtpMailer {
        SmtpMailer::new(SmtpConfig::new("smtp.example.com", "shop@example.com", "pw")).unwrap()
    }

    #[test]
    fn test_builds_multipart_when_html_present() {
        let message = mailer()
            .build_message(&EmailMessage {
                to: "ada@example.com".to_string(),
                subject: "Hi".to_string(),
                text: "plain".to_string(),
                html: Some("<p>rich</p>".to_string()),
            })
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("\"Test App\" <shop@example.com>") || raw.contains("Test App <shop@example.com>"));
    }

    #[test]
    fn test_bad_recipient_is_permanent() {
        let err = mailer()
            .build_message(&EmailMessage {
                to: "not an address".to_string(),
                subject: "Hi".to_string(),
                text: "plain".to_string(),
                html: None,
            })
            .unwrap_err();

        assert!(matches!(err, MailError::InvalidAddress(_)));
    }
}
