//! HTTP layer for the storefront backend.
//!
//! Handlers are the imperative shell: they extract the caller and the
//! request body, call one service operation and map the result (or the
//! [`AppError`]) to a response. All business rules live in `storefront-core`.
//!
//! # Request Flow
//!
//! 1. **Correlation ID** assigned by [`middleware::correlation_id_layer`]
//! 2. **Caller** resolved from the bearer token by [`extractors::Authenticated`]
//! 3. **Role/ownership** checked with `storefront_auth::authorize`
//! 4. **Service call** through [`AppState`]
//! 5. **Result** serialized as JSON, errors via [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! let state = AppState::new(&env, auth);
//! let app = storefront_web::router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{Admin, Authenticated, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
