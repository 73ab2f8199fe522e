//! Error types for authentication and authorization operations.

use storefront_core::ServiceError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of authentication and authorization.
///
/// Display strings of the user-facing variants are returned to API callers
/// verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Password did not match the stored hash.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected request.
    #[error("Access token missing")]
    TokenMissing,

    /// Token failed signature, format or expiry checks.
    #[error("Invalid or expired token")]
    InvalidToken,

    // ═══════════════════════════════════════════════════════════
    // Authorization Errors
    // ═══════════════════════════════════════════════════════════

    /// Caller's role or identity does not permit the operation.
    #[error("Forbidden: insufficient permissions")]
    InsufficientPermissions,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// bcrypt failed or its worker task died.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// The token could not be signed.
    #[error("Token encoding failed: {0}")]
    TokenEncoding(String),

    /// Failure reported by the account service.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use storefront_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::PasswordHash("boom".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        match self {
            Self::InvalidCredentials
            | Self::TokenMissing
            | Self::InvalidToken
            | Self::InsufficientPermissions => true,
            Self::Service(err) => err.is_client_error(),
            Self::PasswordHash(_) | Self::TokenEncoding(_) => false,
        }
    }
}
