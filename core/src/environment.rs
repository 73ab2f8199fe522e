//! Injected dependencies shared by every service.

use crate::outbox::Outbox;
use crate::stores::{
    AccountStore, CartStore, CatalogStore, NotificationStore, OrderStore, RatingStore,
    SidebarStore, StoreHealth,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use storefront_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let _now = clock.now();
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Dependencies of the storefront services.
///
/// Cheap to clone: every field is an `Arc`.
#[derive(Clone)]
pub struct Environment {
    /// Accounts and profiles
    pub accounts: Arc<dyn AccountStore>,
    /// Categories and products
    pub catalog: Arc<dyn CatalogStore>,
    /// Orders and stock reservation
    pub orders: Arc<dyn OrderStore>,
    /// Ratings
    pub ratings: Arc<dyn RatingStore>,
    /// Carts
    pub carts: Arc<dyn CartStore>,
    /// Notifications
    pub notifications: Arc<dyn NotificationStore>,
    /// Sidebar menus
    pub sidebar: Arc<dyn SidebarStore>,
    /// Store readiness probe
    pub health: Arc<dyn StoreHealth>,
    /// Side-effect queue
    pub outbox: Arc<dyn Outbox>,
    /// Time source
    pub clock: Arc<dyn Clock>,
}

impl Environment {
    /// Build an environment where a single store backs every trait.
    #[must_use]
    pub fn from_store<S>(store: &Arc<S>, outbox: Arc<dyn Outbox>, clock: Arc<dyn Clock>) -> Self
    where
        S: AccountStore
            + CatalogStore
            + OrderStore
            + RatingStore
            + CartStore
            + NotificationStore
            + SidebarStore
            + StoreHealth
            + 'static,
    {
        Self {
            accounts: store.clone(),
            catalog: store.clone(),
            orders: store.clone(),
            ratings: store.clone(),
            carts: store.clone(),
            notifications: store.clone(),
            sidebar: store.clone(),
            health: store.clone(),
            outbox,
            clock,
        }
    }
}
