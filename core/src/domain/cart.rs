//! Per-user shopping carts.
//!
//! Carts are advisory: they never touch product stock. Stock is only checked
//! and reserved when an order is placed.

use crate::domain::catalog::ProductSummary;
use crate::domain::order::LineItem;
use crate::types::{ProductId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's cart. At most one line per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owner
    #[serde(rename = "user")]
    pub user_id: UserId,
    /// Line items
    pub items: Vec<LineItem>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: now,
        }
    }

    /// Add units of a product, merging into an existing line when present.
    pub fn add_item(&mut self, product_id: ProductId, quantity: u32, now: DateTime<Utc>) {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.items.push(LineItem::new(product_id, quantity)),
        }
        self.updated_at = now;
    }

    /// Replace the quantity of an existing line. Returns `false` when the
    /// product is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32, now: DateTime<Utc>) -> bool {
        let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) else {
            return false;
        };
        line.quantity = quantity;
        self.updated_at = now;
        true
    }

    /// Remove a product's line. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: ProductId, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.updated_at = now;
        self.items.len() != before
    }

    /// Empty the cart.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.updated_at = now;
    }
}

/// Cart line joined with product details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    /// Product id
    pub product_id: ProductId,
    /// Units in the cart
    pub quantity: u32,
    /// Product name and price, when the product still exists
    pub product: Option<ProductSummary>,
}

/// Cart with product details, as returned by the cart endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Owner
    pub user: UserId,
    /// Lines with product details
    pub items: Vec<CartLineView>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_same_product_twice_merges_lines() {
        let now = Utc::now();
        let product = ProductId::new();
        let mut cart = Cart::new(UserId::new(), now);

        cart.add_item(product, 2, now);
        cart.add_item(product, 3, now);

        assert_eq!(cart.items, vec![LineItem::new(product, 5)]);
    }

    #[test]
    fn test_add_different_products_appends() {
        let now = Utc::now();
        let (a, b) = (ProductId::new(), ProductId::new());
        let mut cart = Cart::new(UserId::new(), now);

        cart.add_item(a, 1, now);
        cart.add_item(b, 1, now);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[1].product_id, b);
    }

    #[test]
    fn test_set_quantity_requires_existing_line() {
        let now = Utc::now();
        let product = ProductId::new();
        let mut cart = Cart::new(UserId::new(), now);

        assert!(!cart.set_quantity(product, 4, now));

        cart.add_item(product, 1, now);
        assert!(cart.set_quantity(product, 4, now));
        assert_eq!(cart.items[0].quantity, 4);
    }

    #[test]
    fn test_remove_and_clear() {
        let now = Utc::now();
        let (a, b) = (ProductId::new(), ProductId::new());
        let mut cart = Cart::new(UserId::new(), now);
        cart.add_item(a, 1, now);
        cart.add_item(b, 1, now);

        assert!(cart.remove_item(a, now));
        assert!(!cart.remove_item(a, now));
        assert_eq!(cart.items, vec![LineItem::new(b, 1)]);

        cart.clear(now);
        assert!(cart.items.is_empty());
    }
}
