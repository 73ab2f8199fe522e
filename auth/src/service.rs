//! Registration and login.

use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use crate::token::TokenService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storefront_core::domain::account::{NewAccount, UserView};
use storefront_core::environment::Clock;
use storefront_core::metrics::LOGINS_TOTAL;
use storefront_core::services::AccountService;
use storefront_core::{Actor, Role, ServiceError};

/// Registration payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login and contact email
    pub email: String,
    /// Contact phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Plain-text password
    pub password: String,
    /// Requested role (customer when absent)
    #[serde(default)]
    pub user_type: Option<Role>,
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Always "Login successful"
    pub message: String,
    /// Signed bearer token
    pub token: String,
    /// Role of the account
    pub user_type: Role,
}

/// Credential flows on top of [`AccountService`].
#[derive(Clone)]
pub struct AuthService {
    accounts: AccountService,
    tokens: TokenService,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub fn new(
        accounts: AccountService,
        tokens: TokenService,
        hasher: PasswordHasher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
            clock,
        }
    }

    /// Hash the password and create the account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Service`] with `InvalidInput` for an empty password or
    ///   with `Conflict` for a taken email
    /// - [`AuthError::PasswordHash`] if hashing fails
    pub async fn register(&self, request: RegisterRequest) -> Result<UserView> {
        if request.password.is_empty() {
            return Err(ServiceError::InvalidInput("Password is required".to_string()).into());
        }
        let password_hash = self.hasher.hash(&request.password).await?;

        let user = self
            .accounts
            .create_account(NewAccount {
                name: request.name,
                email: request.email,
                phone: request.phone,
                password_hash,
                role: request.user_type.unwrap_or_default(),
            })
            .await?;
        Ok(user)
    }

    /// Check credentials and issue a token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Service`] with `NotFound` ("User not found") for an
    ///   unknown email
    /// - [`AuthError::InvalidCredentials`] for a wrong password
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let Some(account) = self.accounts.find_account_by_email(&request.email).await? else {
            metrics::counter!(LOGINS_TOTAL, "outcome" => "unknown_user").increment(1);
            return Err(ServiceError::not_found("User").into());
        };

        if !self
            .hasher
            .verify(&request.password, &account.password_hash)
            .await?
        {
            metrics::counter!(LOGINS_TOTAL, "outcome" => "bad_password").increment(1);
            tracing::info!(account_id = %account.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&account, self.clock.now())?;
        metrics::counter!(LOGINS_TOTAL, "outcome" => "success").increment(1);
        tracing::info!(account_id = %account.id, role = %account.role, "Login successful");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
            user_type: account.role,
        })
    }

    /// Resolve a bearer token to the calling actor.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] for a bad or expired token.
    pub fn authenticate(&self, token: &str) -> Result<Actor> {
        self.tokens.verify(token).map(|claims| claims.actor())
    }
}
