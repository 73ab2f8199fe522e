//! `PostgreSQL` persistence for the storefront.
//!
//! [`PostgresStore`] implements every store trait from `storefront-core`
//! over a single connection pool. Queries are built at runtime with
//! `sqlx::query_as`, so the crate compiles without a live database.
//!
//! Order placement relies on [`OrderStore::commit_order`]: all stock
//! decrements and the order insert run in one transaction, and each decrement
//! is conditional on enough stock remaining.
//!
//! # Example
//!
//! ```no_run
//! use storefront_postgres::PostgresStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStore::connect("postgres://localhost/storefront", 10).await?;
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`OrderStore::commit_order`]: storefront_core::stores::OrderStore::commit_order

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod accounts;
mod carts;
mod catalog;
mod notifications;
mod orders;
mod ratings;
mod sidebar;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use storefront_core::error::StoreError;
use storefront_core::stores::{StoreHealth, StoreResult};

/// `PostgreSQL`-backed implementation of every storefront store trait.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the connection cannot be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(db_err("connect to database"))?;
        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StoreHealth for PostgresStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_err("ping database"))?;
        Ok(())
    }
}

/// Map a sqlx error to [`StoreError::Database`] with the failed action.
pub(crate) fn db_err(action: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| StoreError::Database(format!("Failed to {action}: {e}"))
}

/// Like [`db_err`], but a unique violation becomes [`StoreError::Conflict`].
pub(crate) fn unique_err(
    action: &'static str,
    conflict: String,
) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(conflict);
            }
        }
        StoreError::Database(format!("Failed to {action}: {e}"))
    }
}

/// A stored value that no longer fits its domain type.
pub(crate) fn corrupt(what: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Internal(format!("corrupt {what}: {detail}"))
}

/// Quantities are `u32` in the domain and `INTEGER` in the schema.
pub(crate) fn to_db_quantity(quantity: u32) -> StoreResult<i32> {
    i32::try_from(quantity).map_err(|_| StoreError::Internal(format!("quantity {quantity} out of range")))
}

pub(crate) fn from_db_quantity(quantity: i32) -> StoreResult<u32> {
    u32::try_from(quantity).map_err(|e| corrupt("quantity", e))
}
