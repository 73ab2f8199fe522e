//! Error types for stores and services.

use crate::domain::order::{PlanError, Shortfall, shortfall_names};
use thiserror::Error;

/// Errors reported by store implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record referenced by the operation does not exist.
    #[error("{entity} not found")]
    NotFound {
        /// Kind of record (e.g. "Product")
        entity: &'static str,
    },

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),

    /// A conditional stock decrement failed; nothing was committed.
    #[error("Not enough stock for {}", shortfall_names(.0))]
    InsufficientStock(Vec<Shortfall>),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Store internals failed (poisoned lock, corrupt row, ...).
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Failure taxonomy of every storefront operation.
///
/// Messages of the client-facing variants are shown to API callers verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Missing account, product, order, notification, ...
    #[error("{0}")]
    NotFound(String),

    /// One or more products lack the requested stock.
    #[error("Not enough stock for {}", shortfall_names(.shortfalls))]
    InsufficientStock {
        /// Every failing line
        shortfalls: Vec<Shortfall>,
    },

    /// The caller may not perform this operation.
    #[error("{0}")]
    Forbidden(String),

    /// Malformed or out-of-range input.
    #[error("{0}")]
    InvalidInput(String),

    /// Uniqueness violation (duplicate email, model number).
    #[error("{0}")]
    Conflict(String),

    /// Anything else. The message is logged, never shown.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ServiceError {
    /// `"{entity} not found"`.
    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    /// Returns `true` if the error was caused by the caller rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity } => Self::not_found(entity),
            StoreError::Conflict(message) => Self::Conflict(message),
            StoreError::InsufficientStock(shortfalls) => Self::InsufficientStock { shortfalls },
            StoreError::Database(_) | StoreError::Internal(_) => Self::Unexpected(err.to_string()),
        }
    }
}

impl From<PlanError> for ServiceError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Empty | PlanError::ZeroQuantity(_) => Self::InvalidInput(err.to_string()),
            PlanError::UnknownProducts(_) => Self::NotFound(err.to_string()),
            PlanError::InsufficientStock(shortfalls) => Self::InsufficientStock { shortfalls },
        }
    }
}
