//! Login accounts and user profiles.
//!
//! An [`Account`] holds credentials and the role; a [`User`] holds the
//! profile. They reference each other one-to-one.

use crate::types::{AccountId, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login credentials and role.
///
/// Never serialized: the password hash must not leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account id (token subject)
    pub id: AccountId,
    /// Login email, unique across accounts
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Role used for authorization
    pub role: Role,
    /// Back-reference to the profile
    pub user_id: UserId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// User profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Profile id
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Owning account
    #[serde(rename = "loginRef")]
    pub account_id: AccountId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Profile joined with the account role, as returned by the user endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Profile id
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Role of the owning account
    pub user_type: Role,
}

impl UserView {
    /// Join a profile with its role.
    #[must_use]
    pub fn from_user(user: &User, role: Role) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            user_type: role,
        }
    }
}

/// Name and email of a user, embedded in order and rating listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Profile id
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Input for creating an account plus profile. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name
    pub name: String,
    /// Login and contact email
    pub email: String,
    /// Contact phone
    pub phone: Option<String>,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Requested role
    pub role: Role,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New display name
    pub name: Option<String>,
    /// New contact email
    pub email: Option<String>,
    /// New phone
    pub phone: Option<String>,
}

impl UserPatch {
    /// Apply the patch to a profile.
    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.email = normalize_email(email);
        }
        if let Some(phone) = &self.phone {
            user.phone = Some(phone.clone());
        }
        user.updated_at = now;
    }
}

/// Canonical form of an email address used for lookups and uniqueness.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal structural check for an email address.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            account_id: AccountId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut user = sample_user();
        let patch = UserPatch {
            phone: Some("555-0100".to_string()),
            ..UserPatch::default()
        };

        patch.apply(&mut user, Utc::now());

        assert_eq!(user.name, "Ada");
        assert_eq!(user.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_patch_normalizes_email() {
        let mut user = sample_user();
        let patch = UserPatch {
            email: Some("  Ada@Example.COM ".to_string()),
            ..UserPatch::default()
        };

        patch.apply(&mut user, Utc::now());

        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("a@b.io"));
        assert!(!is_plausible_email("no-at-sign"));
        assert!(!is_plausible_email("@b.io"));
        assert!(!is_plausible_email("a@nodot"));
        assert!(!is_plausible_email("a b@c.io"));
    }

    #[test]
    fn test_user_view_carries_role() {
        let user = sample_user();
        let view = UserView::from_user(&user, Role::Admin);
        assert_eq!(view.user_type, Role::Admin);
        assert_eq!(view.email, user.email);
    }
}
