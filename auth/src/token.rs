//! JWT issuing and verification.

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use storefront_core::domain::account::Account;
use storefront_core::{AccountId, Actor, Role, UserId};

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: AccountId,
    /// Profile id the account owns
    pub uid: UserId,
    /// Account role
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// The caller identity carried by the token.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.uid, self.role)
    }
}

/// Signs and verifies HS256 tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expires_in_secs: i64,
}

impl TokenService {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            expires_in_secs: config.expires_in_secs,
        }
    }

    /// Issue a token for `account`, valid from `now` for the configured lifetime.
    ///
    /// # Errors
    ///
    /// [`AuthError::TokenEncoding`] if signing fails.
    pub fn issue(&self, account: &Account, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: account.id,
            uid: account.user_id,
            role: account.role,
            iat,
            exp: iat.saturating_add(self.expires_in_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenEncoding(e.to_string()))
    }

    /// Verify signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] for any malformed, forged or expired token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!(error = %err, "Token rejected");
                AuthError::InvalidToken
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use storefront_core::environment::Clock;
    use storefront_testing::test_clock;

    fn account(role: Role) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            role,
            user_id: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new(&TokenConfig::new("secret"));
        let account = account(Role::Admin);

        let token = tokens.issue(&account, Utc::now()).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.actor(), Actor::new(account.user_id, Role::Admin));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let tokens = TokenService::new(&TokenConfig::new("secret"));

        // Issued at 2025-01-01 with a one hour lifetime.
        let token = tokens.issue(&account(Role::Customer), test_clock().now()).unwrap();

        assert_eq!(tokens.verify(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let ours = TokenService::new(&TokenConfig::new("secret"));
        let theirs = TokenService::new(&TokenConfig::new("other").with_expires_in(60));

        let token = theirs.issue(&account(Role::Admin), Utc::now()).unwrap();

        assert_eq!(ours.verify(&token), Err(AuthError::InvalidToken));
        assert_eq!(ours.verify("not.a.jwt"), Err(AuthError::InvalidToken));
    }
}
