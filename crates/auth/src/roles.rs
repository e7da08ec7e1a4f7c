use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name.
///
/// Roles are opaque strings at this layer; the role-to-permission mapping
/// lives in storage. Two names carry built-in meaning: `admin` widens query
/// scope and marks users that cannot be deleted, and both `admin` and `user`
/// are system roles that the role endpoints refuse to delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub const ADMIN: RoleName = RoleName(Cow::Borrowed("admin"));
    pub const USER: RoleName = RoleName(Cow::Borrowed("user"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_admin(&self) -> bool {
        *self == Self::ADMIN
    }

    /// System roles are seeded and must always exist.
    pub fn is_system(&self) -> bool {
        *self == Self::ADMIN || *self == Self::USER
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_user_are_system_roles() {
        assert!(RoleName::ADMIN.is_system());
        assert!(RoleName::USER.is_system());
        assert!(!RoleName::new("editor").is_system());
    }

    #[test]
    fn only_the_admin_name_is_admin() {
        assert!(RoleName::ADMIN.is_admin());
        assert!(!RoleName::USER.is_admin());
        assert!(!RoleName::new("administrator").is_admin());
    }
}
