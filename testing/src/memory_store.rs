//! In-memory implementation of every store trait.
//!
//! All state sits behind one mutex, so each trait method is atomic with
//! respect to every other: `commit_order` checks and decrements all lines
//! under a single lock acquisition, which is what makes concurrent orders
//! against the last unit safe here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use storefront_core::domain::account::{Account, User, UserPatch, UserView};
use storefront_core::domain::cart::Cart;
use storefront_core::domain::catalog::{
    Category, CategoryPatch, Product, ProductPatch, Subcategory,
};
use storefront_core::domain::notification::Notification;
use storefront_core::domain::order::{Order, OrderStatus, Shortfall};
use storefront_core::domain::rating::{Rating, average_rating};
use storefront_core::domain::sidebar::{SidebarMenu, SidebarMenuPatch};
use storefront_core::error::StoreError;
use storefront_core::stores::{
    AccountStore, CartStore, CatalogStore, NotificationStore, OrderStore, RatingStore,
    SidebarStore, StoreHealth, StoreResult,
};
use storefront_core::types::{
    AccountId, CategoryId, MenuId, NotificationId, OrderId, ProductId, Role, UserId,
};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    // Vecs keep insertion order for listings.
    users: Vec<User>,
    categories: Vec<Category>,
    products: Vec<Product>,
    orders: Vec<Order>,
    ratings: Vec<Rating>,
    carts: HashMap<UserId, Cart>,
    notifications: Vec<Notification>,
    menus: Vec<SidebarMenu>,
}

impl State {
    fn role_of(&self, user: &User) -> Role {
        self.accounts
            .get(&user.account_id)
            .map(|a| a.role)
            .unwrap_or_default()
    }

    fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }
}

/// In-memory storefront store.
///
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```
/// use storefront_testing::InMemoryStore;
/// use storefront_core::stores::CatalogStore;
///
/// # async fn example() -> Result<(), storefront_core::StoreError> {
/// let store = InMemoryStore::new();
/// assert!(store.list_products().await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Internal("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, account: Account, user: User) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("Email already registered".to_string()));
        }
        state.accounts.insert(account.id, account);
        state.users.push(user);
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .lock()?
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.lock()?.users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<User>> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn get_user_view(&self, id: UserId) -> StoreResult<Option<UserView>> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.id == id)
            .map(|u| UserView::from_user(u, state.role_of(u))))
    }

    async fn list_user_views(&self) -> StoreResult<Vec<UserView>> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .map(|u| UserView::from_user(u, state.role_of(u)))
            .collect())
    }

    async fn update_user(
        &self,
        id: UserId,
        patch: &UserPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut state = self.lock()?;
        Ok(state.users.iter_mut().find(|u| u.id == id).map(|user| {
            patch.apply(user, now);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let Some(index) = state.users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        let user = state.users.remove(index);
        state.accounts.remove(&user.account_id);
        Ok(true)
    }

    async fn admin_user_ids(&self) -> StoreResult<Vec<UserId>> {
        let state = self.lock()?;
        Ok(state
            .users
            .iter()
            .filter(|u| state.role_of(u) == Role::Admin)
            .map(|u| u.id)
            .collect())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_category(&self, category: Category) -> StoreResult<()> {
        self.lock()?.categories.push(category);
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(self.lock()?.categories.clone())
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.lock()?.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn add_subcategory(
        &self,
        id: CategoryId,
        subcategory: Subcategory,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Category>> {
        let mut state = self.lock()?;
        Ok(state.categories.iter_mut().find(|c| c.id == id).map(|category| {
            category.subcategories.push(subcategory);
            category.updated_at = now;
            category.clone()
        }))
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Category>> {
        let mut state = self.lock()?;
        Ok(state.categories.iter_mut().find(|c| c.id == id).map(|category| {
            patch.apply(category, now);
            category.clone()
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        let mut state = self.lock()?;
        Ok(state
            .categories
            .iter()
            .position(|c| c.id == id)
            .map(|index| state.categories.remove(index)))
    }

    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        let mut state = self.lock()?;
        if state
            .products
            .iter()
            .any(|p| p.model_number == product.model_number)
        {
            return Err(StoreError::Conflict(format!(
                "model number {} already exists",
                product.model_number
            )));
        }
        state.products.push(product);
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        Ok(self.lock()?.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Ok(self.lock()?.products.iter().find(|p| p.id == id).cloned())
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        Ok(self
            .lock()?
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Product>> {
        let mut state = self.lock()?;
        if let Some(model) = &patch.model_number {
            if state
                .products
                .iter()
                .any(|p| p.id != id && &p.model_number == model)
            {
                return Err(StoreError::Conflict(format!(
                    "model number {model} already exists"
                )));
            }
        }
        Ok(state.product_mut(id).map(|product| {
            patch.apply(product, now);
            product.clone()
        }))
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let mut state = self.lock()?;
        Ok(state
            .products
            .iter()
            .position(|p| p.id == id)
            .map(|index| state.products.remove(index)))
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn commit_order(&self, order: Order) -> StoreResult<Order> {
        let mut state = self.lock()?;

        let mut shortfalls = Vec::new();
        for line in &order.items {
            let Some(product) = state.products.iter().find(|p| p.id == line.product_id) else {
                return Err(StoreError::not_found("Product"));
            };
            if product.quantity < line.quantity {
                shortfalls.push(Shortfall {
                    product_id: product.id,
                    product_name: product.product_name.clone(),
                    requested: line.quantity,
                    available: product.quantity,
                });
            }
        }
        if !shortfalls.is_empty() {
            return Err(StoreError::InsufficientStock(shortfalls));
        }

        for line in &order.items {
            if let Some(product) = state.product_mut(line.product_id) {
                product.quantity -= line.quantity;
                product.updated_at = order.created_at;
            }
        }
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        Ok(self.lock()?.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.lock()?.orders.clone())
    }

    async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        Ok(self
            .lock()?
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Order>> {
        let mut state = self.lock()?;
        Ok(state.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.status = status;
            order.updated_at = now;
            order.clone()
        }))
    }

    async fn buyers_of_product(&self, product_id: ProductId) -> StoreResult<Vec<UserId>> {
        let state = self.lock()?;
        let mut buyers = Vec::new();
        for order in state.orders.iter().filter(|o| o.contains(product_id)) {
            if !buyers.contains(&order.user_id) {
                buyers.push(order.user_id);
            }
        }
        Ok(buyers)
    }

    async fn has_completed_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<bool> {
        Ok(self.lock()?.orders.iter().any(|o| {
            o.user_id == user_id && o.status == OrderStatus::Completed && o.contains(product_id)
        }))
    }
}

#[async_trait]
impl RatingStore for InMemoryStore {
    async fn add_rating(&self, rating: Rating) -> StoreResult<Product> {
        let mut state = self.lock()?;
        if !state.products.iter().any(|p| p.id == rating.product_id) {
            return Err(StoreError::not_found("Product"));
        }

        let product_id = rating.product_id;
        let (rating_id, at) = (rating.id, rating.created_at);
        state.ratings.push(rating);
        let values: Vec<u8> = state
            .ratings
            .iter()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.rating)
            .collect();

        let product = state
            .product_mut(product_id)
            .ok_or_else(|| StoreError::not_found("Product"))?;
        product.rating_ids.push(rating_id);
        product.average_rating = average_rating(&values);
        product.updated_at = at;
        Ok(product.clone())
    }

    async fn ratings_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Rating>> {
        Ok(self
            .lock()?
            .ratings
            .iter()
            .rev()
            .filter(|r| r.product_id == product_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn get_cart(&self, user_id: UserId) -> StoreResult<Option<Cart>> {
        Ok(self.lock()?.carts.get(&user_id).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> StoreResult<()> {
        self.lock()?.carts.insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        self.lock()?.notifications.push(notification);
        Ok(())
    }

    async fn notifications_for_user(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        Ok(self
            .lock()?
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_notification(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        Ok(self
            .lock()?
            .notifications
            .iter()
            .find(|n| n.id == id)
            .cloned())
    }

    async fn mark_read(&self, id: NotificationId) -> StoreResult<Option<Notification>> {
        let mut state = self.lock()?;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .map(|notification| {
                notification.read = true;
                notification.clone()
            }))
    }

    async fn delete_notification(&self, id: NotificationId) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let before = state.notifications.len();
        state.notifications.retain(|n| n.id != id);
        Ok(state.notifications.len() != before)
    }
}

#[async_trait]
impl SidebarStore for InMemoryStore {
    async fn insert_menu(&self, menu: SidebarMenu) -> StoreResult<()> {
        self.lock()?.menus.push(menu);
        Ok(())
    }

    async fn list_menus(&self) -> StoreResult<Vec<SidebarMenu>> {
        Ok(self.lock()?.menus.clone())
    }

    async fn update_menu(
        &self,
        id: MenuId,
        patch: &SidebarMenuPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<SidebarMenu>> {
        let mut state = self.lock()?;
        Ok(state.menus.iter_mut().find(|m| m.id == id).map(|menu| {
            patch.apply(menu, now);
            menu.clone()
        }))
    }

    async fn delete_menu(&self, id: MenuId) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let before = state.menus.len();
        state.menus.retain(|m| m.id != id);
        Ok(state.menus.len() != before)
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_clock;
    use storefront_core::Money;
    use storefront_core::domain::order::{LineItem, OrderPlan};
    use storefront_core::environment::Clock;

    fn product(name: &str, model: &str, quantity: u32) -> Product {
        let now = test_clock().now();
        Product {
            id: ProductId::new(),
            product_name: name.to_string(),
            model_number: model.to_string(),
            description: None,
            category_id: None,
            quantity,
            price: Money::from_cents(1000),
            status: storefront_core::domain::catalog::ProductStatus::Active,
            rating_ids: Vec::new(),
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    fn order(lines: Vec<LineItem>) -> Order {
        Order::pending(
            OrderId::new(),
            UserId::new(),
            OrderPlan { lines },
            test_clock().now(),
        )
    }

    #[tokio::test]
    async fn test_commit_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let lamp = product("Lamp", "L-1", 5);
        let desk = product("Desk", "D-1", 1);
        store.insert_product(lamp.clone()).await.unwrap();
        store.insert_product(desk.clone()).await.unwrap();

        let result = store
            .commit_order(order(vec![
                LineItem::new(lamp.id, 2),
                LineItem::new(desk.id, 2),
            ]))
            .await;

        assert!(matches!(result, Err(StoreError::InsufficientStock(ref s)) if s.len() == 1));
        assert_eq!(store.get_product(lamp.id).await.unwrap().unwrap().quantity, 5);
        assert_eq!(store.get_product(desk.id).await.unwrap().unwrap().quantity, 1);
        assert!(store.list_orders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_model_number_conflicts() {
        let store = InMemoryStore::new();
        store.insert_product(product("Lamp", "L-1", 1)).await.unwrap();

        let result = store.insert_product(product("Other", "L-1", 1)).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_rating_recomputes_average() {
        let store = InMemoryStore::new();
        let lamp = product("Lamp", "L-1", 1);
        store.insert_product(lamp.clone()).await.unwrap();

        for value in [5, 4] {
            let now = test_clock().now();
            store
                .add_rating(Rating {
                    id: storefront_core::RatingId::new(),
                    rating: value,
                    message: None,
                    user_id: UserId::new(),
                    product_id: lamp.id,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        let updated = store.get_product(lamp.id).await.unwrap().unwrap();
        assert_eq!(updated.rating_ids.len(), 2);
        assert!((updated.average_rating - 4.5).abs() < f64::EPSILON);
    }
}
