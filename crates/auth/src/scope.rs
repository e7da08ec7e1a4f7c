//! Role-based query scoping for event listings.

use evently_core::UserId;

use crate::Actor;

/// What slice of the event set a caller may see.
///
/// Applied as a row predicate before filtering and pagination, so page totals
/// never leak the existence of records outside the caller's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Admins see every event.
    All,
    /// Everyone else sees their own events plus public ones.
    OwnerOrPublic(UserId),
}

impl EventScope {
    pub fn for_actor(actor: &Actor) -> Self {
        if actor.is_admin() {
            Self::All
        } else {
            Self::OwnerOrPublic(actor.user_id)
        }
    }

    pub fn permits(&self, owner: UserId, is_public: bool) -> bool {
        match self {
            Self::All => true,
            Self::OwnerOrPublic(caller) => owner == *caller || is_public,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RoleName;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn admin_scope_sees_everything() {
        let scope = EventScope::All;
        assert!(scope.permits(UserId::new(1), false));
        assert!(scope.permits(UserId::new(2), true));
    }

    #[test]
    fn member_scope_sees_own_and_public_only() {
        let scope = EventScope::OwnerOrPublic(UserId::new(1));
        assert!(scope.permits(UserId::new(1), false));
        assert!(scope.permits(UserId::new(2), true));
        assert!(!scope.permits(UserId::new(2), false));
    }

    #[test]
    fn scope_follows_the_role_name_not_the_permission_set() {
        let admin = Actor::new(UserId::new(1), Some(RoleName::ADMIN), HashSet::new());
        let member = Actor::new(UserId::new(1), Some(RoleName::USER), HashSet::new());
        let role_less = Actor::without_role(UserId::new(1));

        assert_eq!(EventScope::for_actor(&admin), EventScope::All);
        assert_eq!(
            EventScope::for_actor(&member),
            EventScope::OwnerOrPublic(UserId::new(1))
        );
        assert_eq!(
            EventScope::for_actor(&role_less),
            EventScope::OwnerOrPublic(UserId::new(1))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a non-admin caller is shown a row exactly when they own
        /// it or it is public.
        #[test]
        fn member_visibility_is_owner_or_public(
            caller in 1u64..50,
            owner in 1u64..50,
            is_public in any::<bool>()
        ) {
            let scope = EventScope::OwnerOrPublic(UserId::new(caller));
            prop_assert_eq!(
                scope.permits(UserId::new(owner), is_public),
                caller == owner || is_public
            );
        }
    }
}
