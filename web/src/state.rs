//! Application state for Axum handlers.

use std::sync::Arc;
use storefront_auth::AuthService;
use storefront_core::Environment;
use storefront_core::services::{
    AccountService, CartService, CatalogService, NotificationService, OrderService,
    RatingService, SidebarService,
};
use storefront_core::stores::StoreHealth;

/// Application state shared across all HTTP handlers.
///
/// Every service shares one [`Environment`], so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Credential flows and token verification
    pub auth: AuthService,
    /// User profiles
    pub accounts: AccountService,
    /// Categories and products
    pub catalog: CatalogService,
    /// Order placement and status
    pub orders: OrderService,
    /// Product ratings
    pub ratings: RatingService,
    /// Shopping carts
    pub carts: CartService,
    /// In-app notifications
    pub notifications: NotificationService,
    /// Sidebar menus
    pub sidebar: SidebarService,
    /// Readiness probe
    pub health: Arc<dyn StoreHealth>,
}

impl AppState {
    /// Build the state from a wired environment and an auth service.
    #[must_use]
    pub fn new(env: &Environment, auth: AuthService) -> Self {
        Self {
            auth,
            accounts: AccountService::new(env.clone()),
            catalog: CatalogService::new(env.clone()),
            orders: OrderService::new(env.clone()),
            ratings: RatingService::new(env.clone()),
            carts: CartService::new(env.clone()),
            notifications: NotificationService::new(env.clone()),
            sidebar: SidebarService::new(env.clone()),
            health: env.health.clone(),
        }
    }
}
