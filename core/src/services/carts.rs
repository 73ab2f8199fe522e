//! Per-user shopping carts. Carts never touch stock.

use crate::domain::cart::{Cart, CartLineView, CartView};
use crate::domain::catalog::{Product, ProductSummary};
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult};
use crate::types::{ProductId, UserId};
use std::collections::HashMap;

/// Cart operations.
#[derive(Clone)]
pub struct CartService {
    env: Environment,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// The user's cart with product name and price per line.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Cart is empty") when the user has no cart.
    pub async fn get(&self, user_id: UserId) -> ServiceResult<CartView> {
        let Some(cart) = self.env.carts.get_cart(user_id).await? else {
            return Err(ServiceError::NotFound("Cart is empty".to_string()));
        };
        self.view(cart).await
    }

    /// Add units of a product, merging with an existing line.
    ///
    /// Creates the cart on first use.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for a zero quantity
    /// - [`ServiceError::NotFound`] for an unknown product
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ServiceResult<CartView> {
        if quantity == 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }
        if self.env.catalog.get_product(product_id).await?.is_none() {
            return Err(ServiceError::not_found("Product"));
        }

        let now = self.env.clock.now();
        let mut cart = self
            .env
            .carts
            .get_cart(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id, now));
        cart.add_item(product_id, quantity, now);
        self.env.carts.save_cart(&cart).await?;

        tracing::debug!(%user_id, %product_id, quantity, "Item added to cart");
        self.view(cart).await
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Cart not found" / "Item not in cart").
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ServiceResult<CartView> {
        if quantity == 0 {
            return Err(ServiceError::InvalidInput(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let mut cart = self.existing(user_id).await?;
        if !cart.set_quantity(product_id, quantity, self.env.clock.now()) {
            return Err(ServiceError::NotFound("Item not in cart".to_string()));
        }
        self.env.carts.save_cart(&cart).await?;
        self.view(cart).await
    }

    /// Drop a line if present.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Cart not found") when the user has no cart.
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> ServiceResult<CartView> {
        let mut cart = self.existing(user_id).await?;
        if cart.remove_item(product_id, self.env.clock.now()) {
            self.env.carts.save_cart(&cart).await?;
        }
        self.view(cart).await
    }

    /// Empty the cart. A user without a cart is left without one.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn clear(&self, user_id: UserId) -> ServiceResult<()> {
        if let Some(mut cart) = self.env.carts.get_cart(user_id).await? {
            cart.clear(self.env.clock.now());
            self.env.carts.save_cart(&cart).await?;
        }
        Ok(())
    }

    async fn existing(&self, user_id: UserId) -> ServiceResult<Cart> {
        self.env
            .carts
            .get_cart(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart not found".to_string()))
    }

    async fn view(&self, cart: Cart) -> ServiceResult<CartView> {
        let ids: Vec<ProductId> = cart.items.iter().map(|i| i.product_id).collect();
        let products: HashMap<ProductId, Product> = self
            .env
            .catalog
            .products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(CartView {
            user: cart.user_id,
            items: cart
                .items
                .iter()
                .map(|item| CartLineView {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    product: products.get(&item.product_id).map(ProductSummary::from),
                })
                .collect(),
            updated_at: cart.updated_at,
        })
    }
}
