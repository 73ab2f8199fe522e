//! Role and ownership checks.

use crate::error::{AuthError, Result};
use storefront_core::{Actor, Role, UserId};

/// Require the caller's role to be one of `allowed`.
///
/// # Errors
///
/// [`AuthError::InsufficientPermissions`] otherwise.
pub fn require_role(actor: &Actor, allowed: &[Role]) -> Result<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.user_id, role = %actor.role, "Role not permitted");
        Err(AuthError::InsufficientPermissions)
    }
}

/// Require an administrator.
///
/// # Errors
///
/// [`AuthError::InsufficientPermissions`] for non-admins.
pub fn require_admin(actor: &Actor) -> Result<()> {
    require_role(actor, &[Role::Admin])
}

/// Require the caller to be `user_id` or an administrator.
///
/// # Errors
///
/// [`AuthError::InsufficientPermissions`] otherwise.
pub fn require_self_or_admin(actor: &Actor, user_id: UserId) -> Result<()> {
    if actor.can_act_for(user_id) {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.user_id, target = %user_id, "Not owner or admin");
        Err(AuthError::InsufficientPermissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_gate() {
        let customer = Actor::new(UserId::new(), Role::Customer);
        let admin = Actor::new(UserId::new(), Role::Admin);

        assert_eq!(require_admin(&customer), Err(AuthError::InsufficientPermissions));
        assert_eq!(require_admin(&admin), Ok(()));
        assert_eq!(require_role(&customer, &[Role::Customer, Role::Admin]), Ok(()));
    }

    #[test]
    fn test_ownership_gate() {
        let customer = Actor::new(UserId::new(), Role::Customer);
        let admin = Actor::new(UserId::new(), Role::Admin);

        assert_eq!(require_self_or_admin(&customer, customer.user_id), Ok(()));
        assert_eq!(
            require_self_or_admin(&customer, UserId::new()),
            Err(AuthError::InsufficientPermissions)
        );
        assert_eq!(require_self_or_admin(&admin, customer.user_id), Ok(()));
    }
}
