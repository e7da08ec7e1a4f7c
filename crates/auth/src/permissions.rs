use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission key.
///
/// Keys are opaque strings following the `can:<action>:<resource>` naming
/// convention (e.g. `can:view:event`). The evaluator never parses them; a key
/// grants exactly itself, nothing implies anything else. New keys can be
/// minted at runtime by creating permission records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionKey(Cow<'static, str>);

impl PermissionKey {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Well-known gate keys checked by route handlers.
///
/// These are the keys the seeder installs. They are constants so handlers
/// cannot typo a gate, but the evaluator itself treats them as plain strings.
pub mod gates {
    use super::PermissionKey;

    pub const EVENT_VIEW: PermissionKey = PermissionKey::from_static("can:view:event");
    pub const EVENT_CREATE: PermissionKey = PermissionKey::from_static("can:create:event");
    pub const EVENT_UPDATE: PermissionKey = PermissionKey::from_static("can:update:event");
    pub const EVENT_DELETE: PermissionKey = PermissionKey::from_static("can:delete:event");

    pub const USER_VIEW: PermissionKey = PermissionKey::from_static("can:view:user");
    pub const USER_CREATE: PermissionKey = PermissionKey::from_static("can:create:user");
    pub const USER_UPDATE: PermissionKey = PermissionKey::from_static("can:update:user");
    pub const USER_DELETE: PermissionKey = PermissionKey::from_static("can:delete:user");

    pub const ROLE_VIEW: PermissionKey = PermissionKey::from_static("can:view:role");
    pub const ROLE_CREATE: PermissionKey = PermissionKey::from_static("can:create:role");
    pub const ROLE_UPDATE: PermissionKey = PermissionKey::from_static("can:update:role");
    pub const ROLE_DELETE: PermissionKey = PermissionKey::from_static("can:delete:role");

    pub const PERMISSION_VIEW: PermissionKey = PermissionKey::from_static("can:view:permission");
    pub const PERMISSION_CREATE: PermissionKey =
        PermissionKey::from_static("can:create:permission");
    pub const PERMISSION_UPDATE: PermissionKey =
        PermissionKey::from_static("can:update:permission");
    pub const PERMISSION_DELETE: PermissionKey =
        PermissionKey::from_static("can:delete:permission");

    pub const AUDIT_VIEW: PermissionKey = PermissionKey::from_static("can:view:audit");

    /// Every key the seeder installs. The admin role holds all of them.
    pub const ALL: [PermissionKey; 17] = [
        AUDIT_VIEW,
        PERMISSION_VIEW,
        PERMISSION_CREATE,
        PERMISSION_UPDATE,
        PERMISSION_DELETE,
        ROLE_VIEW,
        ROLE_CREATE,
        ROLE_UPDATE,
        ROLE_DELETE,
        USER_VIEW,
        USER_CREATE,
        USER_UPDATE,
        USER_DELETE,
        EVENT_VIEW,
        EVENT_CREATE,
        EVENT_UPDATE,
        EVENT_DELETE,
    ];

    /// Keys granted to the default `user` role.
    pub const EVENT_GATES: [PermissionKey; 4] =
        [EVENT_VIEW, EVENT_CREATE, EVENT_UPDATE, EVENT_DELETE];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_gate_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for key in gates::ALL {
            assert!(seen.insert(key.as_str().to_string()), "duplicate key {key}");
        }
        assert_eq!(seen.len(), 17);
    }

    #[test]
    fn event_gates_are_a_subset_of_all() {
        for key in gates::EVENT_GATES {
            assert!(gates::ALL.contains(&key));
        }
    }
}
