//! Error types for web handlers.
//!
//! [`AppError`] bridges service and auth errors to HTTP responses. Client
//! errors render as `{code, message}` (plus `products` for stock failures);
//! server errors render as `{code, error}` with a generic message and log the
//! underlying cause.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use storefront_auth::AuthError;
use storefront_core::{ProductId, ServiceError};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> WebResult<Json<Vec<UserView>>> {
///     Ok(Json(state.accounts.list_users().await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: &'static str,
    /// Products that lacked stock, for `INSUFFICIENT_STOCK`
    products: Option<Vec<ProductId>>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            products: None,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Create a 403 Forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", message)
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[derive(Debug, Serialize)]
struct ClientErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    products: Option<Vec<ProductId>>,
}

#[derive(Debug, Serialize)]
struct ServerErrorBody {
    code: &'static str,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }

            let body = ServerErrorBody {
                code: self.code,
                error: self.message,
            };
            return (self.status, Json(body)).into_response();
        }

        let body = ClientErrorBody {
            code: self.code,
            message: self.message,
            products: self.products,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => Self::not_found(message),
            ServiceError::InsufficientStock { ref shortfalls } => {
                let mut error = Self::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK", err.to_string());
                error.products = Some(shortfalls.iter().map(|s| s.product_id).collect());
                error
            }
            ServiceError::Forbidden(message) => Self::forbidden(message),
            ServiceError::InvalidInput(message) => Self::bad_request(message),
            ServiceError::Conflict(message) => Self::conflict(message),
            ServiceError::Unexpected(_) => {
                Self::internal(INTERNAL_MESSAGE).with_source(anyhow::Error::new(err))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS", err.to_string())
            }
            AuthError::TokenMissing => Self::unauthorized(err.to_string()),
            AuthError::InvalidToken => {
                Self::new(StatusCode::FORBIDDEN, "INVALID_TOKEN", err.to_string())
            }
            AuthError::InsufficientPermissions => Self::forbidden(err.to_string()),
            AuthError::PasswordHash(_) | AuthError::TokenEncoding(_) => {
                Self::internal(INTERNAL_MESSAGE).with_source(anyhow::Error::new(err))
            }
            AuthError::Service(service) => service.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(INTERNAL_MESSAGE).with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use storefront_core::domain::order::Shortfall;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_service_error_statuses() {
        let cases = [
            (ServiceError::not_found("Product"), StatusCode::NOT_FOUND),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ServiceError::Unexpected("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            AppError::from(AuthError::TokenMissing).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::InsufficientPermissions).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_lists_products() {
        let lamp = ProductId::new();
        let err = ServiceError::InsufficientStock {
            shortfalls: vec![Shortfall {
                product_id: lamp,
                product_name: "Lamp".into(),
                requested: 3,
                available: 2,
            }],
        };

        let (status, body) = body_json(err.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["message"], "Not enough stock for Lamp");
        assert_eq!(body["products"][0], lamp.to_string());
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let (status, body) =
            body_json(ServiceError::Unexpected("connection reset".into()).into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], INTERNAL_MESSAGE);
        assert!(body.get("message").is_none());
    }
}
