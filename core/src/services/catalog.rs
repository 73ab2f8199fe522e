//! Categories and products.

use crate::domain::catalog::{
    Category, CategoryPatch, MAX_STOCK, NewCategory, NewProduct, NewSubcategory, Product,
    ProductPatch, ProductView, Subcategory,
};
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::types::{CategoryId, ProductId, SubcategoryId};
use std::collections::HashMap;

/// Catalog operations.
#[derive(Clone)]
pub struct CatalogService {
    env: Environment,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    // ------------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------------

    /// Create a category.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidInput`] for a blank name.
    pub async fn create_category(&self, input: NewCategory) -> ServiceResult<Category> {
        let name = required(&input.category_name, "Category name")?;
        let now = self.env.clock.now();
        let category = Category {
            id: CategoryId::new(),
            category_name: name,
            description: input.description,
            subcategories: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.env.catalog.insert_category(category.clone()).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// Append a subcategory to a category.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for a blank name
    /// - [`ServiceError::NotFound`] ("Category not found")
    pub async fn add_subcategory(
        &self,
        category_id: CategoryId,
        input: NewSubcategory,
    ) -> ServiceResult<Category> {
        let subcategory = Subcategory {
            id: SubcategoryId::new(),
            sub_category_name: required(&input.sub_category_name, "Subcategory name")?,
            description: input.description,
        };
        self.env
            .catalog
            .add_subcategory(category_id, subcategory, self.env.clock.now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Category"))
    }

    /// Every category.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.env.catalog.list_categories().await?)
    }

    /// Patch a category.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Category not found").
    pub async fn update_category(
        &self,
        id: CategoryId,
        patch: CategoryPatch,
    ) -> ServiceResult<Category> {
        if let Some(name) = &patch.category_name {
            required(name, "Category name")?;
        }
        self.env
            .catalog
            .update_category(id, &patch, self.env.clock.now())
            .await?
            .ok_or_else(|| ServiceError::not_found("Category"))
    }

    /// Delete a category with its subcategories and return it.
    ///
    /// Products keep their (now dangling) category reference.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Category not found").
    pub async fn delete_category(&self, id: CategoryId) -> ServiceResult<Category> {
        self.env
            .catalog
            .delete_category(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Category"))
    }

    // ------------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------------

    /// Create a product.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for blank name/model, negative price
    ///   or a quantity above [`MAX_STOCK`]
    /// - [`ServiceError::NotFound`] when the category does not exist
    /// - [`ServiceError::Conflict`] when the model number is taken
    pub async fn create_product(&self, input: NewProduct) -> ServiceResult<Product> {
        required(&input.product_name, "Product name")?;
        required(&input.model_number, "Model number")?;
        if input.price.is_negative() {
            return Err(ServiceError::InvalidInput(
                "Price cannot be negative".to_string(),
            ));
        }
        stock_in_range(input.quantity)?;
        if let Some(category_id) = input.category_id {
            self.ensure_category(category_id).await?;
        }

        let product = input.into_product(ProductId::new(), self.env.clock.now());
        self.env
            .catalog
            .insert_product(product.clone())
            .await
            .map_err(model_conflict)?;
        tracing::info!(product_id = %product.id, quantity = product.quantity, "Product created");
        Ok(product)
    }

    /// Every product with its category name.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_products(&self) -> ServiceResult<Vec<ProductView>> {
        let products = self.env.catalog.list_products().await?;
        let names: HashMap<CategoryId, String> = self
            .env
            .catalog
            .list_categories()
            .await?
            .into_iter()
            .map(|c| (c.id, c.category_name))
            .collect();
        Ok(products
            .into_iter()
            .map(|product| ProductView {
                category_name: product.category_id.and_then(|id| names.get(&id).cloned()),
                product,
            })
            .collect())
    }

    /// One product with its category name.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Product not found").
    pub async fn get_product(&self, id: ProductId) -> ServiceResult<ProductView> {
        let Some(product) = self.env.catalog.get_product(id).await? else {
            return Err(ServiceError::not_found("Product"));
        };
        let category_name = match product.category_id {
            Some(category_id) => self
                .env
                .catalog
                .get_category(category_id)
                .await?
                .map(|c| c.category_name),
            None => None,
        };
        Ok(ProductView {
            product,
            category_name,
        })
    }

    /// Patch a product.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for blank name/model, negative price
    ///   or a quantity above [`MAX_STOCK`]
    /// - [`ServiceError::NotFound`] for an unknown product or category
    /// - [`ServiceError::Conflict`] when the new model number is taken
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Product> {
        if let Some(name) = &patch.product_name {
            required(name, "Product name")?;
        }
        if let Some(model) = &patch.model_number {
            required(model, "Model number")?;
        }
        if patch.price.is_some_and(|price| price.is_negative()) {
            return Err(ServiceError::InvalidInput(
                "Price cannot be negative".to_string(),
            ));
        }
        if let Some(quantity) = patch.quantity {
            stock_in_range(quantity)?;
        }
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id).await?;
        }

        let product = self
            .env
            .catalog
            .update_product(id, &patch, self.env.clock.now())
            .await
            .map_err(model_conflict)?
            .ok_or_else(|| ServiceError::not_found("Product"))?;
        tracing::info!(product_id = %id, quantity = product.quantity, "Product updated");
        Ok(product)
    }

    /// Delete a product and return it.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("Product not found").
    pub async fn delete_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.env
            .catalog
            .delete_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product"))
    }

    async fn ensure_category(&self, id: CategoryId) -> ServiceResult<()> {
        match self.env.catalog.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found("Category")),
        }
    }
}

fn required(value: &str, field: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn stock_in_range(quantity: u32) -> ServiceResult<()> {
    if quantity > MAX_STOCK {
        return Err(ServiceError::InvalidInput(format!(
            "Quantity cannot exceed {MAX_STOCK}"
        )));
    }
    Ok(())
}

fn model_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::Conflict(_) => {
            ServiceError::Conflict("Model number already exists".to_string())
        }
        other => other.into(),
    }
}
