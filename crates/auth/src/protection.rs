//! Protection rules for destructive actions.
//!
//! These run as a second gate after the permission check: holding
//! `can:delete:user` still does not let a caller delete themselves or an
//! admin. Each rule is a pure function returning the first matching denial,
//! so individual denials can be pinned in tests without HTTP plumbing.

use serde::Serialize;

use evently_core::UserId;

use crate::{Actor, RoleName};

/// Why a protection rule refused an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Event delete attempted by a non-admin who does not own it.
    NotEventOwner,
    /// User delete aimed at the caller's own account.
    OwnAccount,
    /// User delete aimed at an account holding the admin role.
    AdminAccount,
    /// Role delete aimed at a system role.
    SystemRole,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotEventOwner => "You can only delete your own events.",
            DenyReason::OwnAccount => "You cannot delete your own account.",
            DenyReason::AdminAccount => "Admin users cannot be deleted.",
            DenyReason::SystemRole => "Cannot delete system roles.",
        }
    }
}

/// Admins may delete any event; everyone else only their own.
pub fn check_event_delete(actor: &Actor, owner: UserId) -> Result<(), DenyReason> {
    if actor.is_admin() || actor.user_id == owner {
        Ok(())
    } else {
        Err(DenyReason::NotEventOwner)
    }
}

/// A user is never deletable by themselves, and admin accounts are never
/// deletable by anyone. Checked in that order.
pub fn check_user_delete(
    actor: &Actor,
    target: UserId,
    target_role: Option<&RoleName>,
) -> Result<(), DenyReason> {
    if actor.user_id == target {
        return Err(DenyReason::OwnAccount);
    }
    if target_role.is_some_and(RoleName::is_admin) {
        return Err(DenyReason::AdminAccount);
    }
    Ok(())
}

/// The seeded `admin` and `user` roles must always exist.
pub fn check_role_delete(name: &RoleName) -> Result<(), DenyReason> {
    if name.is_system() {
        Err(DenyReason::SystemRole)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn admin(id: u64) -> Actor {
        Actor::new(UserId::new(id), Some(RoleName::ADMIN), HashSet::new())
    }

    fn member(id: u64) -> Actor {
        Actor::new(UserId::new(id), Some(RoleName::USER), HashSet::new())
    }

    #[test]
    fn owner_and_admin_may_delete_an_event() {
        let owner = UserId::new(10);
        assert!(check_event_delete(&member(10), owner).is_ok());
        assert!(check_event_delete(&admin(1), owner).is_ok());
    }

    #[test]
    fn non_owner_non_admin_may_not_delete_an_event() {
        let err = check_event_delete(&member(11), UserId::new(10)).unwrap_err();
        assert_eq!(err, DenyReason::NotEventOwner);
        assert_eq!(err.message(), "You can only delete your own events.");
    }

    #[test]
    fn self_deletion_is_refused() {
        let err = check_user_delete(&admin(1), UserId::new(1), Some(&RoleName::ADMIN)).unwrap_err();
        assert_eq!(err, DenyReason::OwnAccount);
    }

    #[test]
    fn admin_accounts_are_refused_even_for_other_admins() {
        let err = check_user_delete(&admin(1), UserId::new(2), Some(&RoleName::ADMIN)).unwrap_err();
        assert_eq!(err, DenyReason::AdminAccount);
        assert_eq!(err.message(), "Admin users cannot be deleted.");
    }

    #[test]
    fn ordinary_targets_are_deletable() {
        assert!(check_user_delete(&admin(1), UserId::new(3), Some(&RoleName::USER)).is_ok());
        assert!(check_user_delete(&admin(1), UserId::new(4), None).is_ok());
    }

    #[test]
    fn system_roles_are_refused_custom_roles_pass() {
        assert_eq!(
            check_role_delete(&RoleName::ADMIN).unwrap_err(),
            DenyReason::SystemRole
        );
        assert_eq!(
            check_role_delete(&RoleName::USER).unwrap_err(),
            DenyReason::SystemRole
        );
        assert!(check_role_delete(&RoleName::new("editor")).is_ok());
    }
}
