//! Identifiers and small value objects shared across the storefront.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a login account
    AccountId
);
define_id!(
    /// Unique identifier for a user profile
    UserId
);
define_id!(
    /// Unique identifier for a product category
    CategoryId
);
define_id!(
    /// Unique identifier for a subcategory embedded in a category
    SubcategoryId
);
define_id!(
    /// Unique identifier for a product
    ProductId
);
define_id!(
    /// Unique identifier for an order
    OrderId
);
define_id!(
    /// Unique identifier for a rating
    RatingId
);
define_id!(
    /// Unique identifier for a notification
    NotificationId
);
define_id!(
    /// Unique identifier for a sidebar menu entry
    MenuId
);

// ============================================================================
// Roles
// ============================================================================

/// Account role. Drives route gating and sidebar visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Store administrator
    Admin,
    /// Regular shopper
    #[default]
    Customer,
}

impl Role {
    /// Wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    /// Profile of the caller
    pub user_id: UserId,
    /// Role carried by the caller's token
    pub role: Role,
}

impl Actor {
    /// Create a new actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Admins may act for anyone; everyone else only for themselves.
    #[must_use]
    pub fn can_act_for(&self, user_id: UserId) -> bool {
        self.is_admin() || self.user_id == user_id
    }
}

// ============================================================================
// Money
// ============================================================================

/// Money in minor units (cents) to avoid floating point errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create money from cents.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Amount in cents.
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whether the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_uuid() {
        let uuid = Uuid::new_v4();
        let id = ProductId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_id_parses_from_str() {
        let id = OrderId::new();
        let parsed: OrderId = id.to_string().parse().unwrap_or_default();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<OrderId>().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).ok().as_deref(), Some("\"admin\""));
        assert_eq!("customer".parse::<Role>(), Ok(Role::Customer));
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::Customer);
    }

    #[test]
    fn test_actor_permissions() {
        let me = UserId::new();
        let other = UserId::new();

        let customer = Actor::new(me, Role::Customer);
        assert!(customer.can_act_for(me));
        assert!(!customer.can_act_for(other));

        let admin = Actor::new(me, Role::Admin);
        assert!(admin.can_act_for(other));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1999).to_string(), "$19.99");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-250).to_string(), "-$2.50");
    }
}
