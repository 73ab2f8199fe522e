//! Persistence traits.
//!
//! Every method is a single atomic operation from the caller's point of view.
//! Implementations live in `storefront-postgres` (production) and
//! `storefront-testing` (in-memory).

use crate::domain::account::{Account, User, UserPatch, UserView};
use crate::domain::cart::Cart;
use crate::domain::catalog::{Category, CategoryPatch, Product, ProductPatch, Subcategory};
use crate::domain::notification::Notification;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::rating::Rating;
use crate::domain::sidebar::{SidebarMenu, SidebarMenuPatch};
use crate::error::StoreError;
use crate::types::{
    AccountId, CategoryId, MenuId, NotificationId, OrderId, ProductId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Accounts and user profiles.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account and its profile together.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] when the email is already registered.
    async fn create_account(&self, account: Account, user: User) -> StoreResult<()>;

    /// Look up an account by its (normalized) login email.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Look up an account by id.
    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Look up a profile by id.
    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Profiles with the given ids; missing ids are skipped.
    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>>;

    /// Profile joined with its account role.
    async fn get_user_view(&self, id: UserId) -> StoreResult<Option<UserView>>;

    /// Every profile joined with its account role.
    async fn list_user_views(&self) -> StoreResult<Vec<UserView>>;

    /// Apply a profile patch. Returns `None` when the profile does not exist.
    async fn update_user(
        &self,
        id: UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>>;

    /// Delete a profile and its account. Returns whether anything was deleted.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    /// Profile ids of every admin account.
    async fn admin_user_ids(&self) -> StoreResult<Vec<UserId>>;
}

/// Categories and products.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a category.
    async fn insert_category(&self, category: Category) -> StoreResult<()>;

    /// Every category.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;

    /// Look up a category.
    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    /// Append a subcategory. Returns `None` when the category does not exist.
    async fn add_subcategory(
        &self,
        id: CategoryId,
        subcategory: Subcategory,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Category>>;

    /// Apply a category patch. Returns `None` when the category does not exist.
    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Category>>;

    /// Delete a category with its subcategories, returning it.
    async fn delete_category(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] when the model number is taken.
    async fn insert_product(&self, product: Product) -> StoreResult<()>;

    /// Every product.
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    /// Look up a product.
    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>>;

    /// Products with the given ids; missing ids are skipped.
    async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>>;

    /// Apply a product patch. Returns `None` when the product does not exist.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] when the new model number is taken.
    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Product>>;

    /// Delete a product, returning it.
    async fn delete_product(&self, id: ProductId) -> StoreResult<Option<Product>>;
}

/// Orders and the stock reservation that goes with them.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Reserve stock for every line and record the order, all or nothing.
    ///
    /// Each line is applied as "decrement if at least `quantity` remain".
    /// If any line fails, no stock changes and the order is not recorded.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InsufficientStock`] when a conditional decrement fails
    /// - [`StoreError::NotFound`] when a product disappeared
    async fn commit_order(&self, order: Order) -> StoreResult<Order>;

    /// Look up an order.
    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>>;

    /// Every order, oldest first.
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;

    /// Orders placed by a user, oldest first.
    async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>>;

    /// Set an order's status. Returns `None` when the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Order>>;

    /// Distinct buyers who have ever ordered the product.
    async fn buyers_of_product(&self, product_id: ProductId) -> StoreResult<Vec<UserId>>;

    /// Whether the user holds a completed order containing the product.
    async fn has_completed_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<bool>;
}

/// Ratings and the product rating aggregate.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Insert a rating, attach it to its product and recompute the product's
    /// average over all its ratings, atomically. Returns the updated product.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the product does not exist.
    async fn add_rating(&self, rating: Rating) -> StoreResult<Product>;

    /// Ratings of a product, newest first.
    async fn ratings_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Rating>>;
}

/// Per-user carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Look up a user's cart.
    async fn get_cart(&self, user_id: UserId) -> StoreResult<Option<Cart>>;

    /// Insert or replace a user's cart.
    async fn save_cart(&self, cart: &Cart) -> StoreResult<()>;
}

/// In-app notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a notification.
    async fn insert_notification(&self, notification: Notification) -> StoreResult<()>;

    /// Notifications of a user, newest first.
    async fn notifications_for_user(&self, user_id: UserId) -> StoreResult<Vec<Notification>>;

    /// Look up a notification.
    async fn get_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>>;

    /// Flip the read flag. Returns `None` when the notification does not exist.
    async fn mark_read(&self, id: NotificationId) -> StoreResult<Option<Notification>>;

    /// Delete a notification. Returns whether it existed.
    async fn delete_notification(&self, id: NotificationId) -> StoreResult<bool>;
}

/// Sidebar menus.
#[async_trait]
pub trait SidebarStore: Send + Sync {
    /// Insert a menu entry.
    async fn insert_menu(&self, menu: SidebarMenu) -> StoreResult<()>;

    /// Every menu entry, oldest first.
    async fn list_menus(&self) -> StoreResult<Vec<SidebarMenu>>;

    /// Apply a menu patch. Returns `None` when the menu does not exist.
    async fn update_menu(
        &self,
        id: MenuId,
        patch: &SidebarMenuPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SidebarMenu>>;

    /// Delete a menu entry. Returns whether it existed.
    async fn delete_menu(&self, id: MenuId) -> StoreResult<bool>;
}

/// Readiness probe for the backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Check that the store can serve requests.
    async fn ping(&self) -> StoreResult<()>;
}
