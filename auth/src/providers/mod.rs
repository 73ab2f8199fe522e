//! Mail transports implementing [`storefront_core::mailer::Mailer`].
//!
//! - [`SmtpMailer`]: real delivery through an SMTP relay (lettre)
//! - [`ConsoleMailer`]: logs messages instead of sending them (development)

mod console_mailer;
mod smtp_mailer;

pub use console_mailer::ConsoleMailer;
pub use smtp_mailer::SmtpMailer;
