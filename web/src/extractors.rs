//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation ID
//! - [`Authenticated`]: the caller resolved from the bearer token
//! - [`Admin`]: an authenticated caller with the admin role
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     Authenticated(actor): Authenticated,
//!     correlation_id: CorrelationId,
//! ) -> WebResult<Json<Response>> {
//!     tracing::info!(correlation_id = %correlation_id.0, user_id = %actor.user_id, "Processing request");
//!     Ok(Json(response))
//! }
//! ```

use crate::error::AppError;
use crate::middleware::CORRELATION_ID_HEADER;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use storefront_auth::AuthError;
use storefront_auth::authorize::require_admin;
use storefront_core::Actor;
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Uses the ID stored by the correlation middleware, then the
/// `X-Correlation-ID` header, and generates a new UUID v4 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(existing) = parts.extensions.get::<Self>() {
            return Ok(*existing);
        }

        let correlation_id = parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// The caller identified by `Authorization: Bearer <token>`.
///
/// Rejects with 401 when the header is missing and 403 when the token does
/// not verify.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::TokenMissing)?;
        let actor = state.auth.authenticate(token)?;
        Ok(Self(actor))
    }
}

/// An authenticated administrator.
#[derive(Debug, Clone, Copy)]
pub struct Admin(pub Actor);

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Authenticated(actor) = Authenticated::from_request_parts(parts, state).await?;
        require_admin(&actor)?;
        Ok(Self(actor))
    }
}

/// The token of a `Bearer` authorization header, if any.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
