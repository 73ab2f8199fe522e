//! Side-effect descriptions produced by services.
//!
//! Services never send mail or write notifications inline. They build
//! [`Effect`] values and hand them to the [`crate::outbox::Outbox`], which
//! delivers them after the triggering operation has committed.

use crate::domain::account::User;
use crate::domain::order::{Order, OrderStatus};
use crate::mailer::EmailMessage;
use crate::types::{OrderId, UserId};

/// A side effect to perform after an operation commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Store an in-app notification for a user.
    Notify {
        /// Recipient profile
        user_id: UserId,
        /// Short title
        title: String,
        /// Body text
        message: String,
    },

    /// Send an email.
    Email(EmailMessage),
}

impl Effect {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Notify { .. } => "notification",
            Self::Email(_) => "email",
        }
    }
}

/// Welcome email sent after registration.
#[must_use]
pub fn welcome_email(name: &str, email: &str) -> Effect {
    Effect::Email(EmailMessage {
        to: email.to_string(),
        subject: "🎉 Welcome to Our App!".to_string(),
        text: format!("Hi {name}, welcome aboard!"),
        html: Some(format!(
            "<div style=\"font-family: Arial, sans-serif; padding: 20px;\">\
             <h2>Welcome, {name}!</h2>\
             <p>Your account has been created successfully. \
             You can now log in and explore all the features available to you.</p>\
             </div>"
        )),
    })
}

/// Notifications and email emitted when an order is placed: one notification
/// to the buyer, one per admin, and a confirmation email to the buyer.
#[must_use]
pub fn order_placed(buyer: &User, order: &Order, admins: &[UserId]) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(admins.len() + 2);
    effects.push(Effect::Notify {
        user_id: buyer.id,
        title: "🛒 Order Confirmed".to_string(),
        message: format!("Your order ({}) has been placed successfully.", order.id),
    });
    effects.extend(admins.iter().map(|admin| Effect::Notify {
        user_id: *admin,
        title: "🧾 New Order Received".to_string(),
        message: format!("{} just placed an order ({}).", buyer.name, order.id),
    }));
    effects.push(Effect::Email(order_confirmation_email(buyer, order)));
    effects
}

fn order_confirmation_email(buyer: &User, order: &Order) -> EmailMessage {
    EmailMessage {
        to: buyer.email.clone(),
        subject: "🛒 Order Confirmation".to_string(),
        text: format!(
            "Hi {}, your order has been placed successfully.",
            buyer.name
        ),
        html: Some(format!(
            "<div style=\"padding: 20px; font-family: Arial;\">\
             <h2 style=\"color: #4CAF50;\">Thank you for your order!</h2>\
             <p>We've received your order and it's now being processed.</p>\
             <p>Order ID: <strong>{}</strong></p>\
             <p>Status: <strong>{}</strong></p>\
             <p>We'll notify you once the status changes.</p>\
             </div>",
            order.id, order.status
        )),
    }
}

/// Notification to a past buyer of products whose order status changed.
/// `product_names` is already joined for display.
#[must_use]
pub fn product_status_notification(
    user_id: UserId,
    product_names: &str,
    status: OrderStatus,
) -> Effect {
    Effect::Notify {
        user_id,
        title: "📦 Product Status Updated".to_string(),
        message: format!("A product you ordered ({product_names}) is now marked as \"{status}\"."),
    }
}

/// Email to the buyer of an order whose status changed.
#[must_use]
pub fn order_status_email(buyer: &User, order_id: OrderId, status: OrderStatus) -> Effect {
    Effect::Email(EmailMessage {
        to: buyer.email.clone(),
        subject: "📦 Order Status Updated".to_string(),
        text: format!(
            "Hi {}, your order status has changed to \"{status}\".",
            buyer.name
        ),
        html: Some(format!(
            "<div style=\"font-family: Arial, sans-serif; padding: 30px;\">\
             <h2 style=\"color: #007BFF;\">📦 Order Status Updated</h2>\
             <p>Hello <strong>{}</strong>,</p>\
             <p>Your order <strong>#{order_id}</strong> has been updated to:</p>\
             <p style=\"font-size: 18px;\"><strong>{}</strong></p>\
             </div>",
            buyer.name,
            status.as_str().to_uppercase()
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{LineItem, OrderPlan};
    use crate::types::{AccountId, ProductId};
    use chrono::Utc;

    fn buyer() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            phone: None,
            account_id: AccountId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_order_placed_effects() {
        let buyer = buyer();
        let order = Order::pending(
            OrderId::new(),
            buyer.id,
            OrderPlan {
                lines: vec![LineItem::new(ProductId::new(), 1)],
            },
            Utc::now(),
        );
        let admins = [UserId::new(), UserId::new()];

        let effects = order_placed(&buyer, &order, &admins);

        assert_eq!(effects.len(), 4);
        assert!(matches!(
            &effects[0],
            Effect::Notify { user_id, title, .. } if *user_id == buyer.id && title == "🛒 Order Confirmed"
        ));
        assert!(matches!(
            &effects[1],
            Effect::Notify { message, .. } if message == &format!("Grace just placed an order ({}).", order.id)
        ));
        assert!(matches!(
            &effects[3],
            Effect::Email(email) if email.to == "grace@example.com" && email.subject == "🛒 Order Confirmation"
        ));
    }

    #[test]
    fn test_status_notification_text() {
        let effect = product_status_notification(UserId::new(), "Lamp", OrderStatus::Completed);
        assert!(matches!(
            effect,
            Effect::Notify { message, .. } if message == "A product you ordered (Lamp) is now marked as \"completed\"."
        ));
    }
}
