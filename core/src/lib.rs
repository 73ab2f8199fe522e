//! # Storefront Core
//!
//! Domain types, persistence traits and services for the storefront backend.
//!
//! The crate follows a "Functional Core, Imperative Shell" split:
//!
//! - **Domain** (`domain`): entities and pure rules (order planning, rating
//!   averages, cart merging, sidebar visibility). No I/O.
//! - **Stores** (`stores`): async traits the persistence layer implements.
//! - **Services** (`services`): the imperative shell. Each operation loads
//!   what it needs through the stores, applies the pure rules, commits, and
//!   hands side effects to the [`outbox::Outbox`].
//! - **Environment** (`environment`): injected dependencies (stores, outbox,
//!   clock) shared by every service.
//!
//! ## Example
//!
//! ```ignore
//! use storefront_core::services::OrderService;
//! use storefront_core::domain::order::LineItem;
//!
//! let orders = OrderService::new(env.clone());
//! let order = orders
//!     .place_order(buyer_id, vec![LineItem::new(product_id, 2)])
//!     .await?;
//! assert_eq!(order.status, OrderStatus::Pending);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod effects;
pub mod environment;
pub mod error;
pub mod mailer;
pub mod metrics;
pub mod outbox;
pub mod retry;
pub mod services;
pub mod stores;
pub mod types;

pub use environment::{Clock, Environment, SystemClock};
pub use error::{ServiceError, StoreError};
pub use types::{
    AccountId, Actor, CategoryId, MenuId, Money, NotificationId, OrderId, ProductId, RatingId,
    Role, SubcategoryId, UserId,
};
