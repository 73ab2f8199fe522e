//! Storefront operations.
//!
//! Each service wraps an [`Environment`](crate::Environment) clone, loads what
//! it needs through the stores, applies the pure domain rules and enqueues
//! side effects once its write has committed.

mod accounts;
mod carts;
mod catalog;
mod notifications;
mod orders;
mod ratings;
mod sidebar;

pub use accounts::AccountService;
pub use carts::CartService;
pub use catalog::CatalogService;
pub use notifications::NotificationService;
pub use orders::OrderService;
pub use ratings::RatingService;
pub use sidebar::SidebarService;
