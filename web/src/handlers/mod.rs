//! HTTP request handlers, organized by resource.

pub mod cart;
pub mod categories;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod sidebar;
pub mod users;

use serde::Serialize;

pub use health::{health_check, readiness_check};

/// `{"message": ...}` acknowledgement body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: &'static str,
}

impl MessageResponse {
    /// Wrap a message.
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}
