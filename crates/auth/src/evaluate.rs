use std::collections::HashSet;

use thiserror::Error;

use evently_core::UserId;

use crate::{PermissionKey, RoleName};

/// A fully resolved caller for authorization decisions.
///
/// Construction is decoupled from storage and transport: the HTTP layer
/// resolves the authenticated user's role and that role's permission keys
/// from the store, once per request. Changing a role's grants therefore
/// takes effect on the next request, with no token re-issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Option<RoleName>,
    pub permissions: HashSet<PermissionKey>,
}

impl Actor {
    pub fn new(
        user_id: UserId,
        role: Option<RoleName>,
        permissions: HashSet<PermissionKey>,
    ) -> Self {
        Self {
            user_id,
            role,
            permissions,
        }
    }

    /// Role-less caller. Holds no permissions, so every gate denies.
    pub fn without_role(user_id: UserId) -> Self {
        Self::new(user_id, None, HashSet::new())
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(RoleName::is_admin)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Evaluate a single gate.
///
/// Exact set membership over the actor's permission keys. No wildcard, no
/// hierarchy, no inference: holding `can:view:event` says nothing about any
/// other key.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn can(actor: &Actor, required: &PermissionKey) -> bool {
    actor.permissions.contains(required)
}

/// Fail-closed form of [`can`] for handler gates.
pub fn require(actor: &Actor, required: &PermissionKey) -> Result<(), AuthzError> {
    if can(actor, required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates;
    use proptest::prelude::*;

    fn actor_with(keys: &[PermissionKey]) -> Actor {
        Actor::new(
            UserId::new(1),
            Some(RoleName::new("user")),
            keys.iter().cloned().collect(),
        )
    }

    #[test]
    fn grants_exactly_the_held_keys() {
        let actor = actor_with(&[gates::EVENT_VIEW, gates::EVENT_CREATE]);

        assert!(can(&actor, &gates::EVENT_VIEW));
        assert!(can(&actor, &gates::EVENT_CREATE));
        assert!(!can(&actor, &gates::EVENT_DELETE));
        assert!(!can(&actor, &gates::USER_VIEW));
    }

    #[test]
    fn empty_set_denies_everything() {
        let actor = Actor::without_role(UserId::new(1));
        for key in gates::ALL {
            assert!(!can(&actor, &key));
        }
    }

    #[test]
    fn keys_do_not_imply_each_other() {
        // Same action on another resource, and another action on the same
        // resource, must both stay denied.
        let actor = actor_with(&[gates::EVENT_VIEW]);
        assert!(!can(&actor, &gates::USER_VIEW));
        assert!(!can(&actor, &gates::EVENT_UPDATE));
    }

    #[test]
    fn admin_role_name_grants_nothing_by_itself() {
        let actor = Actor::new(UserId::new(1), Some(RoleName::ADMIN), HashSet::new());
        assert!(!can(&actor, &gates::EVENT_VIEW));
        assert!(require(&actor, &gates::EVENT_VIEW).is_err());
    }

    #[test]
    fn require_reports_the_missing_key() {
        let actor = actor_with(&[]);
        let err = require(&actor, &gates::ROLE_DELETE).unwrap_err();
        match err {
            AuthzError::Forbidden(key) => assert_eq!(key, "can:delete:role"),
        }
    }

    fn key_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,8}:[a-z]{1,8}:[a-z]{1,8}"
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any permission set and any requested key, the
        /// decision is exactly set membership.
        #[test]
        fn decision_is_set_membership(
            held in prop::collection::hash_set(key_strategy(), 0..12),
            requested in key_strategy()
        ) {
            let actor = Actor::new(
                UserId::new(7),
                Some(RoleName::new("user")),
                held.iter().cloned().map(PermissionKey::new).collect(),
            );
            let key = PermissionKey::new(requested.clone());

            prop_assert_eq!(can(&actor, &key), held.contains(&requested));
            prop_assert_eq!(require(&actor, &key).is_ok(), held.contains(&requested));
        }
    }
}
