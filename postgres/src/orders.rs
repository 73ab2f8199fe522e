//! Orders and the transactional stock reservation.

use crate::{PostgresStore, corrupt, db_err, from_db_quantity, to_db_quantity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use storefront_core::domain::order::{LineItem, Order, OrderStatus, Shortfall};
use storefront_core::stores::{OrderStore, StoreResult};
use storefront_core::{OrderId, ProductId, StoreError, UserId};
use uuid::Uuid;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
}

const ORDER_COLUMNS: &str = "SELECT id, user_id, status, created_at, updated_at FROM orders";

impl PostgresStore {
    /// Attach line items to order rows, keeping the row order.
    async fn hydrate(&self, rows: Vec<OrderRow>) -> StoreResult<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let items: Vec<OrderItemRow> = sqlx::query_as(
            "SELECT order_id, product_id, quantity FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY order_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("load order items"))?;

        let mut lines: HashMap<Uuid, Vec<LineItem>> = HashMap::new();
        for item in items {
            lines.entry(item.order_id).or_default().push(LineItem::new(
                ProductId::from_uuid(item.product_id),
                from_db_quantity(item.quantity)?,
            ));
        }

        rows.into_iter()
            .map(|row| {
                Ok(Order {
                    id: OrderId::from_uuid(row.id),
                    user_id: UserId::from_uuid(row.user_id),
                    items: lines.remove(&row.id).unwrap_or_default(),
                    status: row
                        .status
                        .parse::<OrderStatus>()
                        .map_err(|e| corrupt("order status", e.0))?,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id, lines = order.items.len()))]
    async fn commit_order(&self, order: Order) -> StoreResult<Order> {
        let mut tx = self.pool.begin().await.map_err(db_err("begin transaction"))?;

        // Fixed lock order keeps two overlapping orders from deadlocking.
        let mut lines = order.items.clone();
        lines.sort_by_key(|line| line.product_id);

        let mut failed = Vec::new();
        for line in &lines {
            let result = sqlx::query(
                "UPDATE products SET quantity = quantity - $2, updated_at = $3
                 WHERE id = $1 AND quantity >= $2",
            )
            .bind(line.product_id.as_uuid())
            .bind(to_db_quantity(line.quantity)?)
            .bind(order.created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err("reserve stock"))?;
            if result.rows_affected() == 0 {
                failed.push(*line);
            }
        }

        if !failed.is_empty() {
            let mut shortfalls = Vec::with_capacity(failed.len());
            for line in failed {
                let level: Option<(String, i32)> =
                    sqlx::query_as("SELECT product_name, quantity FROM products WHERE id = $1")
                        .bind(line.product_id.as_uuid())
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(db_err("load stock"))?;
                let Some((product_name, available)) = level else {
                    return Err(StoreError::not_found("Product"));
                };
                shortfalls.push(Shortfall {
                    product_id: line.product_id,
                    product_name,
                    requested: line.quantity,
                    available: from_db_quantity(available)?,
                });
            }
            tx.rollback().await.map_err(db_err("roll back order"))?;
            tracing::debug!(failed = shortfalls.len(), "Stock reservation failed");
            return Err(StoreError::InsufficientStock(shortfalls));
        }

        sqlx::query(
            "INSERT INTO orders (id, user_id, status, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err("insert order"))?;

        for (position, item) in (0_i32..).zip(&order.items) {
            sqlx::query(
                "INSERT INTO order_items (order_id, position, product_id, quantity)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id.as_uuid())
            .bind(position)
            .bind(item.product_id.as_uuid())
            .bind(to_db_quantity(item.quantity)?)
            .execute(&mut *tx)
            .await
            .map_err(db_err("insert order item"))?;
        }

        tx.commit().await.map_err(db_err("commit order"))?;
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> StoreResult<Option<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!("{ORDER_COLUMNS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("load order"))?;
        Ok(self.hydrate(rows).await?.pop())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!("{ORDER_COLUMNS} ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list orders"))?;
        self.hydrate(rows).await
    }

    async fn orders_for_user(&self, user_id: UserId) -> StoreResult<Vec<Order>> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{ORDER_COLUMNS} WHERE user_id = $1 ORDER BY created_at, id"))
                .bind(user_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("list user orders"))?;
        self.hydrate(rows).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1
             RETURNING id, user_id, status, created_at, updated_at",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("update order status"))?;
        Ok(self.hydrate(rows).await?.pop())
    }

    async fn buyers_of_product(&self, product_id: ProductId) -> StoreResult<Vec<UserId>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT DISTINCT o.user_id FROM orders o
             JOIN order_items i ON i.order_id = o.id
             WHERE i.product_id = $1",
        )
        .bind(product_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("load buyers"))?;
        Ok(rows.into_iter().map(|(id,)| UserId::from_uuid(id)).collect())
    }

    async fn has_completed_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1 FROM orders o
                 JOIN order_items i ON i.order_id = o.id
                 WHERE o.user_id = $1 AND i.product_id = $2 AND o.status = 'completed'
             )",
        )
        .bind(user_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("check purchase"))?;
        Ok(exists)
    }
}
