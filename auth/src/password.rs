//! Password hashing.
//!
//! bcrypt is CPU-bound, so both hashing and verification run on tokio's
//! blocking pool.

use crate::error::{AuthError, Result};

/// bcrypt work factor used in production.
pub const DEFAULT_COST: u32 = 10;

/// Hashes and verifies passwords with bcrypt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Hasher with the production work factor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the work factor (tests use `bcrypt::MIN_COST`).
    #[must_use]
    pub const fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Hash a password.
    ///
    /// # Errors
    ///
    /// [`AuthError::PasswordHash`] if bcrypt fails or the worker task dies.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("hash task failed: {e}")))?
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Check a password against a stored hash.
    ///
    /// A malformed stored hash counts as a mismatch.
    ///
    /// # Errors
    ///
    /// [`AuthError::PasswordHash`] if the worker task dies.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("verify task failed: {e}")))?;
        Ok(outcome.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Stored password hash could not be parsed");
            false
        }))
    }
}
