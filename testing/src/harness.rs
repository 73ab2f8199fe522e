//! Wired environment plus seeding helpers.

#![allow(clippy::expect_used, clippy::missing_panics_doc)] // Seeding failures are test bugs

use crate::mailer::RecordingMailer;
use crate::memory_store::InMemoryStore;
use crate::mocks::{ManualClock, test_clock};
use std::sync::Arc;
use storefront_core::domain::account::{NewAccount, UserView};
use storefront_core::domain::catalog::{Category, NewCategory, NewProduct, Product};
use storefront_core::domain::order::{LineItem, Order};
use storefront_core::environment::{Clock, Environment};
use storefront_core::outbox::{EffectExecutor, InlineOutbox};
use storefront_core::retry::RetryPolicy;
use storefront_core::services::{
    AccountService, CartService, CatalogService, NotificationService, OrderService,
    RatingService, SidebarService,
};
use storefront_core::stores::{CatalogStore, NotificationStore};
use storefront_core::{Money, ProductId, Role, UserId};

/// An [`Environment`] over an [`InMemoryStore`] with inline effect delivery.
///
/// Effects run before the service call returns, so notifications and sent
/// mail can be asserted immediately.
pub struct TestHarness {
    /// Shared store
    pub store: Arc<InMemoryStore>,
    /// Captured email
    pub mailer: Arc<RecordingMailer>,
    /// Controllable time
    pub clock: Arc<ManualClock>,
    /// Wired services environment
    pub env: Environment,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Harness with a mailer that always succeeds and no retries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mailer(RecordingMailer::new(), RetryPolicy::no_retry())
    }

    /// Harness with a specific mailer and effect retry policy.
    #[must_use]
    pub fn with_mailer(mailer: RecordingMailer, policy: RetryPolicy) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let mailer = Arc::new(mailer);
        let clock = Arc::new(ManualClock::new(test_clock().now()));

        let executor = EffectExecutor::new(store.clone(), mailer.clone(), clock.clone(), policy);
        let env = Environment::from_store(&store, Arc::new(InlineOutbox::new(executor)), clock.clone());

        Self {
            store,
            mailer,
            clock,
            env,
        }
    }

    /// Account service over this harness.
    #[must_use]
    pub fn accounts(&self) -> AccountService {
        AccountService::new(self.env.clone())
    }

    /// Catalog service over this harness.
    #[must_use]
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.env.clone())
    }

    /// Order service over this harness.
    #[must_use]
    pub fn orders(&self) -> OrderService {
        OrderService::new(self.env.clone())
    }

    /// Rating service over this harness.
    #[must_use]
    pub fn ratings(&self) -> RatingService {
        RatingService::new(self.env.clone())
    }

    /// Cart service over this harness.
    #[must_use]
    pub fn carts(&self) -> CartService {
        CartService::new(self.env.clone())
    }

    /// Notification service over this harness.
    #[must_use]
    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.env.clone())
    }

    /// Sidebar service over this harness.
    #[must_use]
    pub fn sidebar(&self) -> SidebarService {
        SidebarService::new(self.env.clone())
    }

    /// Register a user with an email derived from `name`.
    pub async fn seed_user(&self, name: &str, role: Role) -> UserView {
        self.accounts()
            .create_account(NewAccount {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
                phone: None,
                password_hash: "not-a-real-hash".to_string(),
                role,
            })
            .await
            .expect("seed user")
    }

    /// Create a category.
    pub async fn seed_category(&self, name: &str) -> Category {
        self.catalog()
            .create_category(NewCategory {
                category_name: name.to_string(),
                description: None,
            })
            .await
            .expect("seed category")
    }

    /// Create an uncategorised product with a model number derived from `name`.
    pub async fn seed_product(&self, name: &str, quantity: u32, price_cents: i64) -> Product {
        self.catalog()
            .create_product(NewProduct {
                product_name: name.to_string(),
                model_number: format!("{}-{}", name.to_uppercase(), ProductId::new()),
                description: None,
                category_id: None,
                quantity,
                price: Money::from_cents(price_cents),
                status: None,
            })
            .await
            .expect("seed product")
    }

    /// Place a single-line order and mark it completed.
    pub async fn complete_purchase(&self, buyer: UserId, product: ProductId, quantity: u32) -> Order {
        let orders = self.orders();
        let order = orders
            .place_order(buyer, vec![LineItem::new(product, quantity)])
            .await
            .expect("place order");
        orders
            .update_status(order.id, "completed")
            .await
            .expect("complete order")
    }

    /// Current stock of a product.
    pub async fn stock_of(&self, product: ProductId) -> u32 {
        self.store
            .get_product(product)
            .await
            .expect("store")
            .expect("product exists")
            .quantity
    }

    /// Titles of a user's notifications, newest first.
    pub async fn notification_titles(&self, user: UserId) -> Vec<String> {
        self.store
            .notifications_for_user(user)
            .await
            .expect("store")
            .into_iter()
            .map(|n| n.title)
            .collect()
    }
}
