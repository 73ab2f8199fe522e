//! Ratings and the product average.

use crate::{PostgresStore, corrupt, db_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storefront_core::domain::catalog::Product;
use storefront_core::domain::rating::Rating;
use storefront_core::stores::{RatingStore, StoreResult};
use storefront_core::{ProductId, RatingId, StoreError, UserId};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    product_id: Uuid,
    user_id: Uuid,
    rating: i16,
    message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = StoreError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: RatingId::from_uuid(row.id),
            rating: u8::try_from(row.rating).map_err(|e| corrupt("rating", e))?,
            message: row.message,
            user_id: UserId::from_uuid(row.user_id),
            product_id: ProductId::from_uuid(row.product_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl RatingStore for PostgresStore {
    async fn add_rating(&self, rating: Rating) -> StoreResult<Product> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        // Serialises concurrent ratings of the same product.
        let locked: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(rating.product_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("lock product"))?;
        if locked.is_none() {
            return Err(StoreError::not_found("Product"));
        }

        sqlx::query(
            "INSERT INTO ratings (id, product_id, user_id, rating, message, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(rating.id.as_uuid())
        .bind(rating.product_id.as_uuid())
        .bind(rating.user_id.as_uuid())
        .bind(i16::from(rating.rating))
        .bind(&rating.message)
        .bind(rating.created_at)
        .bind(rating.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("insert rating"))?;

        sqlx::query(
            "UPDATE products
             SET average_rating = (SELECT AVG(rating)::float8 FROM ratings WHERE product_id = $1),
                 updated_at = $2
             WHERE id = $1",
        )
        .bind(rating.product_id.as_uuid())
        .bind(rating.created_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("update average rating"))?;

        let product = Self::fetch_product(&mut *tx, rating.product_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Product"))?;

        tx.commit().await.map_err(db_err("commit rating"))?;
        Ok(product)
    }

    async fn ratings_for_product(&self, product_id: ProductId) -> StoreResult<Vec<Rating>> {
        sqlx::query_as::<_, RatingRow>(
            "SELECT id, product_id, user_id, rating, message, created_at, updated_at
             FROM ratings WHERE product_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("list ratings"))?
        .into_iter()
        .map(Rating::try_from)
        .collect()
    }
}
