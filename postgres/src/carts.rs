//! Carts, one row per user with the lines as JSON.

use crate::{PostgresStore, db_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use storefront_core::UserId;
use storefront_core::domain::cart::Cart;
use storefront_core::domain::order::LineItem;
use storefront_core::stores::{CartStore, StoreResult};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct CartRow {
    user_id: Uuid,
    items: Json<Vec<LineItem>>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn get_cart(&self, user_id: UserId) -> StoreResult<Option<Cart>> {
        Ok(sqlx::query_as::<_, CartRow>(
            "SELECT user_id, items, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("load cart"))?
        .map(|row| Cart {
            user_id: UserId::from_uuid(row.user_id),
            items: row.items.0,
            updated_at: row.updated_at,
        }))
    }

    async fn save_cart(&self, cart: &Cart) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO carts (user_id, items, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at",
        )
        .bind(cart.user_id.as_uuid())
        .bind(Json(&cart.items))
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("save cart"))?;
        Ok(())
    }
}
