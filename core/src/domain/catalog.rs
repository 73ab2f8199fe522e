//! Categories, subcategories and products.

use crate::types::{CategoryId, Money, ProductId, RatingId, SubcategoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest stock level a product may hold; stock is stored as a signed
/// 32-bit column.
pub const MAX_STOCK: u32 = i32::MAX.unsigned_abs();

// ============================================================================
// Categories
// ============================================================================

/// A product category with its embedded subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category id
    pub id: CategoryId,
    /// Display name
    pub category_name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Subcategories, deleted together with the category
    pub subcategories: Vec<Subcategory>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A subcategory embedded in a [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    /// Subcategory id
    pub id: SubcategoryId,
    /// Display name
    pub sub_category_name: String,
    /// Free-form description
    pub description: Option<String>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// Display name
    pub category_name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Input for adding a subcategory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubcategory {
    /// Display name
    pub sub_category_name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial category update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    /// New display name
    pub category_name: Option<String>,
    /// New description
    pub description: Option<String>,
}

impl CategoryPatch {
    /// Apply the patch to a category.
    pub fn apply(&self, category: &mut Category, now: DateTime<Utc>) {
        if let Some(name) = &self.category_name {
            category.category_name.clone_from(name);
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
        category.updated_at = now;
    }
}

// ============================================================================
// Products
// ============================================================================

/// Product availability status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    /// On sale
    #[default]
    Active,
    /// Temporarily unavailable
    OutOfStock,
    /// No longer sold
    Discontinued,
}

impl ProductStatus {
    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OutOfStock => "out-of-stock",
            Self::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "out-of-stock" => Ok(Self::OutOfStock),
            "discontinued" => Ok(Self::Discontinued),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

/// A sellable product and its stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id
    pub id: ProductId,
    /// Display name
    pub product_name: String,
    /// Manufacturer model number, unique across products
    pub model_number: String,
    /// Free-form description
    pub description: Option<String>,
    /// Owning category
    #[serde(rename = "category")]
    pub category_id: Option<CategoryId>,
    /// Units in stock; never negative
    pub quantity: u32,
    /// Unit price in cents
    pub price: Money,
    /// Availability status
    pub status: ProductStatus,
    /// Ratings left for this product
    #[serde(rename = "ratings")]
    pub rating_ids: Vec<RatingId>,
    /// Mean of all rating values, 0 when unrated
    pub average_rating: f64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// Display name
    pub product_name: String,
    /// Model number
    pub model_number: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Owning category
    #[serde(default, rename = "category")]
    pub category_id: Option<CategoryId>,
    /// Initial stock
    pub quantity: u32,
    /// Unit price in cents
    pub price: Money,
    /// Initial status (defaults to active)
    #[serde(default)]
    pub status: Option<ProductStatus>,
}

impl NewProduct {
    /// Build the product record.
    #[must_use]
    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> Product {
        Product {
            id,
            product_name: self.product_name.trim().to_string(),
            model_number: self.model_number.trim().to_string(),
            description: self.description,
            category_id: self.category_id,
            quantity: self.quantity,
            price: self.price,
            status: self.status.unwrap_or_default(),
            rating_ids: Vec::new(),
            average_rating: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial product update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New display name
    pub product_name: Option<String>,
    /// New model number
    pub model_number: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New category
    #[serde(rename = "category")]
    pub category_id: Option<CategoryId>,
    /// New stock level
    pub quantity: Option<u32>,
    /// New unit price
    pub price: Option<Money>,
    /// New status
    pub status: Option<ProductStatus>,
}

impl ProductPatch {
    /// Apply the patch to a product.
    pub fn apply(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.product_name {
            product.product_name.clone_from(name);
        }
        if let Some(model) = &self.model_number {
            product.model_number.clone_from(model);
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(category) = self.category_id {
            product.category_id = Some(category);
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        product.updated_at = now;
    }
}

/// Product joined with its category name, as returned by product listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// The product
    #[serde(flatten)]
    pub product: Product,
    /// Name of the owning category, when it still exists
    pub category_name: Option<String>,
}

/// Name and price of a product, embedded in cart and order listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    /// Product id
    pub id: ProductId,
    /// Display name
    pub product_name: String,
    /// Unit price in cents
    pub price: Money,
}

impl From<&Product> for ProductSummary {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            product_name: product.product_name.clone(),
            price: product.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            product_name: " Kettle ".to_string(),
            model_number: "KT-100".to_string(),
            description: None,
            category_id: None,
            quantity: 4,
            price: Money::from_cents(2500),
            status: None,
        }
    }

    #[test]
    fn test_new_product_defaults() {
        let product = new_product().into_product(ProductId::new(), Utc::now());
        assert_eq!(product.product_name, "Kettle");
        assert_eq!(product.status, ProductStatus::Active);
        assert!(product.rating_ids.is_empty());
        assert!(product.average_rating.abs() < f64::EPSILON);
    }

    #[test]
    fn test_product_status_wire_format() {
        let json = serde_json::to_string(&ProductStatus::OutOfStock).unwrap_or_default();
        assert_eq!(json, "\"out-of-stock\"");
        assert_eq!("discontinued".parse(), Ok(ProductStatus::Discontinued));
        assert!("sold".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_product_patch() {
        let mut product = new_product().into_product(ProductId::new(), Utc::now());
        let patch = ProductPatch {
            quantity: Some(0),
            status: Some(ProductStatus::OutOfStock),
            ..ProductPatch::default()
        };

        patch.apply(&mut product, Utc::now());

        assert_eq!(product.quantity, 0);
        assert_eq!(product.status, ProductStatus::OutOfStock);
        assert_eq!(product.model_number, "KT-100");
    }

    #[test]
    fn test_category_patch() {
        let now = Utc::now();
        let mut category = Category {
            id: CategoryId::new(),
            category_name: "Kitchen".to_string(),
            description: None,
            subcategories: vec![],
            created_at: now,
            updated_at: now,
        };

        CategoryPatch {
            description: Some("Pots and pans".to_string()),
            ..CategoryPatch::default()
        }
        .apply(&mut category, now);

        assert_eq!(category.category_name, "Kitchen");
        assert_eq!(category.description.as_deref(), Some("Pots and pans"));
    }
}
