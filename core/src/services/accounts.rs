//! Accounts and user profiles.
//!
//! Password hashing and token issuing live in `storefront-auth`; this service
//! only sees already-hashed credentials.

use crate::domain::account::{
    Account, NewAccount, User, UserPatch, UserView, is_plausible_email, normalize_email,
};
use crate::effects::welcome_email;
use crate::environment::Environment;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::metrics::REGISTRATIONS_TOTAL;
use crate::types::{AccountId, Role, UserId};

/// Account operations.
#[derive(Clone)]
pub struct AccountService {
    env: Environment,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Create an account and its profile, then queue the welcome email.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for a blank name or malformed email
    /// - [`ServiceError::Conflict`] when the email is already registered
    #[tracing::instrument(skip(self, input), fields(role = %input.role))]
    pub async fn create_account(&self, input: NewAccount) -> ServiceResult<UserView> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput("Name is required".to_string()));
        }
        if !is_plausible_email(&input.email) {
            return Err(ServiceError::InvalidInput("Invalid email".to_string()));
        }
        let email = normalize_email(&input.email);

        let now = self.env.clock.now();
        let account_id = AccountId::new();
        let user = User {
            id: UserId::new(),
            name,
            email: email.clone(),
            phone: input.phone,
            account_id,
            created_at: now,
            updated_at: now,
        };
        let account = Account {
            id: account_id,
            email,
            password_hash: input.password_hash,
            role: input.role,
            user_id: user.id,
            created_at: now,
            updated_at: now,
        };

        match self.env.accounts.create_account(account, user.clone()).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(ServiceError::Conflict("Email already registered".to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        self.env
            .outbox
            .enqueue(vec![welcome_email(&user.name, &user.email)])
            .await;

        metrics::counter!(REGISTRATIONS_TOTAL).increment(1);
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(UserView::from_user(&user, input.role))
    }

    /// Look up login credentials by email (normalized here).
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn find_account_by_email(&self, email: &str) -> ServiceResult<Option<Account>> {
        Ok(self
            .env
            .accounts
            .find_account_by_email(&normalize_email(email))
            .await?)
    }

    /// Every user with their role.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_users(&self) -> ServiceResult<Vec<UserView>> {
        Ok(self.env.accounts.list_user_views().await?)
    }

    /// Users whose account role is customer.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unexpected`] on store failure.
    pub async fn list_customers(&self) -> ServiceResult<Vec<UserView>> {
        let mut users = self.env.accounts.list_user_views().await?;
        users.retain(|u| u.user_type == Role::Customer);
        Ok(users)
    }

    /// One user with their role.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("User not found").
    pub async fn get_user(&self, id: UserId) -> ServiceResult<UserView> {
        self.env
            .accounts
            .get_user_view(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Patch a profile. The login email is left untouched.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidInput`] for a malformed email
    /// - [`ServiceError::NotFound`] ("User not found")
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> ServiceResult<UserView> {
        if patch.email.as_deref().is_some_and(|email| !is_plausible_email(email)) {
            return Err(ServiceError::InvalidInput("Invalid email".to_string()));
        }
        if self
            .env
            .accounts
            .update_user(id, &patch, self.env.clock.now())
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found("User"));
        }
        self.get_user(id).await
    }

    /// Delete a profile together with its account.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] ("User not found").
    pub async fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        if self.env.accounts.delete_user(id).await? {
            tracing::info!(user_id = %id, "User deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("User"))
        }
    }
}
