//! Categories and products.

use crate::{PostgresStore, corrupt, db_err, from_db_quantity, to_db_quantity, unique_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use storefront_core::domain::catalog::{
    Category, CategoryPatch, Product, ProductPatch, Subcategory,
};
use storefront_core::stores::{CatalogStore, StoreResult};
use storefront_core::{CategoryId, Money, ProductId, RatingId, StoreError};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    category_name: String,
    description: Option<String>,
    subcategories: Json<Vec<Subcategory>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            category_name: row.category_name,
            description: row.description,
            subcategories: row.subcategories.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    product_name: String,
    model_number: String,
    description: Option<String>,
    category_id: Option<Uuid>,
    quantity: i32,
    price_cents: i64,
    status: String,
    rating_ids: Vec<Uuid>,
    average_rating: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::from_uuid(row.id),
            product_name: row.product_name,
            model_number: row.model_number,
            description: row.description,
            category_id: row.category_id.map(CategoryId::from_uuid),
            quantity: from_db_quantity(row.quantity)?,
            price: Money::from_cents(row.price_cents),
            status: row.status.parse().map_err(|e: String| corrupt("product status", e))?,
            rating_ids: row.rating_ids.into_iter().map(RatingId::from_uuid).collect(),
            average_rating: row.average_rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CATEGORY_COLUMNS: &str =
    "SELECT id, category_name, description, subcategories, created_at, updated_at FROM categories";

const PRODUCT_COLUMNS: &str = "SELECT p.id, p.product_name, p.model_number, p.description,
            p.category_id, p.quantity, p.price_cents, p.status, p.average_rating,
            ARRAY(SELECT r.id FROM ratings r WHERE r.product_id = p.id ORDER BY r.created_at)
                AS rating_ids,
            p.created_at, p.updated_at
     FROM products p";

fn model_taken(model_number: &str) -> String {
    format!("model number {model_number} already exists")
}

impl PostgresStore {
    pub(crate) async fn fetch_product<'e, E>(executor: E, id: ProductId) -> StoreResult<Option<Product>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_COLUMNS} WHERE p.id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(executor)
            .await
            .map_err(db_err("load product"))?
            .map(Product::try_from)
            .transpose()
    }

    async fn fetch_category<'e, E>(executor: E, id: CategoryId, lock: bool) -> StoreResult<Option<Category>>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let suffix = if lock { " FOR UPDATE" } else { "" };
        Ok(
            sqlx::query_as::<_, CategoryRow>(&format!("{CATEGORY_COLUMNS} WHERE id = $1{suffix}"))
                .bind(*id.as_uuid())
                .fetch_optional(executor)
                .await
                .map_err(db_err("load category"))?
                .map(Category::from),
        )
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn insert_category(&self, category: Category) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO categories (id, category_name, description, subcategories, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(category.id.as_uuid())
        .bind(&category.category_name)
        .bind(&category.description)
        .bind(Json(&category.subcategories))
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("insert category"))?;
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(
            sqlx::query_as::<_, CategoryRow>(&format!("{CATEGORY_COLUMNS} ORDER BY created_at"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("list categories"))?
                .into_iter()
                .map(Category::from)
                .collect(),
        )
    }

    async fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Self::fetch_category(&self.pool, id, false).await
    }

    async fn add_subcategory(
        &self,
        id: CategoryId,
        subcategory: Subcategory,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Category>> {
        Ok(sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories
             SET subcategories = subcategories || $2, updated_at = $3
             WHERE id = $1
             RETURNING id, category_name, description, subcategories, created_at, updated_at",
        )
        .bind(id.as_uuid())
        .bind(Json(vec![subcategory]))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("add subcategory"))?
        .map(Category::from))
    }

    async fn update_category(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Category>> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        let Some(mut category) = Self::fetch_category(&mut *tx, id, true).await? else {
            return Ok(None);
        };
        patch.apply(&mut category, now);

        sqlx::query(
            "UPDATE categories SET category_name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(category.id.as_uuid())
        .bind(&category.category_name)
        .bind(&category.description)
        .bind(category.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("update category"))?;

        tx.commit().await.map_err(db_err("commit category"))?;
        Ok(Some(category))
    }

    async fn delete_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(sqlx::query_as::<_, CategoryRow>(
            "DELETE FROM categories WHERE id = $1
             RETURNING id, category_name, description, subcategories, created_at, updated_at",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("delete category"))?
        .map(Category::from))
    }

    async fn insert_product(&self, product: Product) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO products (id, product_name, model_number, description, category_id,
                                   quantity, price_cents, status, average_rating, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(product.id.as_uuid())
        .bind(&product.product_name)
        .bind(&product.model_number)
        .bind(&product.description)
        .bind(product.category_id.map(|id| *id.as_uuid()))
        .bind(to_db_quantity(product.quantity)?)
        .bind(product.price.cents())
        .bind(product.status.as_str())
        .bind(product.average_rating)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(unique_err("insert product", model_taken(&product.model_number)))?;
        Ok(())
    }

    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_COLUMNS} ORDER BY p.created_at"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list products"))?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    async fn get_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        Self::fetch_product(&self.pool, id).await
    }

    async fn products_by_ids(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_COLUMNS} WHERE p.id = ANY($1)"))
            .bind(&ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("load products"))?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    async fn update_product(
        &self,
        id: ProductId,
        patch: &ProductPatch,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Product>> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("lock product"))?;
        if locked.is_none() {
            return Ok(None);
        }
        let Some(mut product) = Self::fetch_product(&mut *tx, id).await? else {
            return Ok(None);
        };
        patch.apply(&mut product, now);

        sqlx::query(
            "UPDATE products
             SET product_name = $2, model_number = $3, description = $4, category_id = $5,
                 quantity = $6, price_cents = $7, status = $8, updated_at = $9
             WHERE id = $1",
        )
        .bind(product.id.as_uuid())
        .bind(&product.product_name)
        .bind(&product.model_number)
        .bind(&product.description)
        .bind(product.category_id.map(|id| *id.as_uuid()))
        .bind(to_db_quantity(product.quantity)?)
        .bind(product.price.cents())
        .bind(product.status.as_str())
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(unique_err("update product", model_taken(&product.model_number)))?;

        tx.commit().await.map_err(db_err("commit product"))?;
        Ok(Some(product))
    }

    async fn delete_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;
        let product = Self::fetch_product(&mut *tx, id).await?;
        if product.is_some() {
            sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(db_err("delete product"))?;
        }
        tx.commit().await.map_err(db_err("commit product delete"))?;
        Ok(product)
    }
}
