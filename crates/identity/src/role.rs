use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evently_core::{DomainError, DomainResult, Entity, PermissionId, RoleId, ValidationErrors};

/// A role: a named set of permission grants.
///
/// The permission set is an index set of permission ids, the join side of the
/// role-to-permission association. Names are slugs; `admin` and `user` are
/// seeded and undeletable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub permissions: BTreeSet<PermissionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

/// Raw role form payload.
///
/// `permissions` distinguishes key-absent (keep current grants on update)
/// from explicit null (clear them) from a list (replace them).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoleInput {
    pub name: Option<String>,
    #[serde(deserialize_with = "crate::serde_util::double_option")]
    pub permissions: Option<Option<Vec<String>>>,
}

/// Requested grant replacement on an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionSync {
    Keep,
    Set(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRoleCreate {
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRoleUpdate {
    pub name: String,
    pub permissions: PermissionSync,
}

pub fn validate_role_create(input: &RoleInput) -> DomainResult<ValidatedRoleCreate> {
    let name = check_name(input)?;
    let permissions = match &input.permissions {
        None | Some(None) => Vec::new(),
        Some(Some(names)) => trimmed(names),
    };
    Ok(ValidatedRoleCreate { name, permissions })
}

pub fn validate_role_update(input: &RoleInput) -> DomainResult<ValidatedRoleUpdate> {
    let name = check_name(input)?;
    let permissions = match &input.permissions {
        None => PermissionSync::Keep,
        Some(None) => PermissionSync::Set(Vec::new()),
        Some(Some(names)) => PermissionSync::Set(trimmed(names)),
    };
    Ok(ValidatedRoleUpdate { name, permissions })
}

fn check_name(input: &RoleInput) -> DomainResult<String> {
    let mut errors = ValidationErrors::new();
    let name = match input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        None => {
            errors.add("name", "The role name is required.");
            None
        }
        Some(name) if name.chars().count() > 255 => {
            errors.add(
                "name",
                "The role name must not be greater than 255 characters.",
            );
            None
        }
        Some(name) if !is_slug(name) => {
            errors.add(
                "name",
                "The role name must contain only lowercase letters, numbers, hyphens, and underscores.",
            );
            None
        }
        Some(name) => Some(name.to_string()),
    };

    errors.into_result()?;
    name.ok_or_else(|| DomainError::internal("role validation lost the name"))
}

/// `^[a-z0-9\-_]+$`
fn is_slug(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn trimmed(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_slug_names() {
        for name in ["editor", "content-manager", "tier_2", "l3"] {
            let input = RoleInput {
                name: Some(name.to_string()),
                permissions: None,
            };
            assert_eq!(validate_role_create(&input).unwrap().name, name);
        }
    }

    #[test]
    fn rejects_non_slug_names() {
        for bad in ["Editor", "with space", "übermod", "semi;colon", "dot.ted"] {
            let input = RoleInput {
                name: Some(bad.to_string()),
                permissions: None,
            };
            let err = validate_role_create(&input).unwrap_err();
            match err {
                DomainError::Validation(errors) => assert!(errors.contains("name"), "{bad:?}"),
                other => panic!("Expected Validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_name_is_required() {
        let err = validate_role_create(&RoleInput::default()).unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                let msgs: Vec<_> = errors.iter().flat_map(|(_, m)| m.to_vec()).collect();
                assert_eq!(msgs, vec!["The role name is required."]);
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn create_collapses_null_permissions_to_empty() {
        let input = RoleInput {
            name: Some("editor".to_string()),
            permissions: Some(None),
        };
        assert!(validate_role_create(&input).unwrap().permissions.is_empty());
    }

    #[test]
    fn update_distinguishes_absent_null_and_list() {
        let keep = RoleInput {
            name: Some("editor".to_string()),
            permissions: None,
        };
        assert_eq!(
            validate_role_update(&keep).unwrap().permissions,
            PermissionSync::Keep
        );

        let clear = RoleInput {
            name: Some("editor".to_string()),
            permissions: Some(None),
        };
        assert_eq!(
            validate_role_update(&clear).unwrap().permissions,
            PermissionSync::Set(Vec::new())
        );

        let set = RoleInput {
            name: Some("editor".to_string()),
            permissions: Some(Some(vec!["can:view:event".to_string()])),
        };
        assert_eq!(
            validate_role_update(&set).unwrap().permissions,
            PermissionSync::Set(vec!["can:view:event".to_string()])
        );
    }

    #[test]
    fn permission_shapes_survive_json() {
        let absent: RoleInput = serde_json::from_str(r#"{"name":"editor"}"#).unwrap();
        assert!(absent.permissions.is_none());

        let null: RoleInput = serde_json::from_str(r#"{"name":"editor","permissions":null}"#).unwrap();
        assert_eq!(null.permissions, Some(None));

        let listed: RoleInput =
            serde_json::from_str(r#"{"name":"editor","permissions":["can:view:event"]}"#).unwrap();
        assert_eq!(
            listed.permissions,
            Some(Some(vec!["can:view:event".to_string()]))
        );
    }
}
