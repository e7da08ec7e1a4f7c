use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evently_core::{DomainError, DomainResult, Entity, PermissionId, ValidationErrors};

/// A permission record.
///
/// The name is the whole semantics: gates match on it verbatim. Renaming a
/// permission therefore changes what it grants everywhere at once, while
/// role associations (kept by id) stay intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub guard: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    pub const DEFAULT_GUARD: &'static str = "web";
}

impl Entity for Permission {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

/// Raw permission form payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PermissionInput {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPermission {
    pub name: String,
}

pub fn validate_permission(input: &PermissionInput) -> DomainResult<ValidatedPermission> {
    let mut errors = ValidationErrors::new();
    let name = match input.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        None => {
            errors.add("name", "The permission name is required.");
            None
        }
        Some(name) if name.chars().count() > 255 => {
            errors.add(
                "name",
                "The permission name must not be greater than 255 characters.",
            );
            None
        }
        Some(name) if !is_key_slug(name) => {
            errors.add(
                "name",
                "The permission name must contain only lowercase letters, numbers, hyphens, underscores, dots, and colons.",
            );
            None
        }
        Some(name) => Some(name.to_string()),
    };

    errors.into_result()?;
    let name = name.ok_or_else(|| DomainError::internal("permission validation lost the name"))?;
    Ok(ValidatedPermission { name })
}

/// `^[a-z0-9\-_.:]+$`: the role slug alphabet plus dots and the colons the
/// seeded `can:<action>:<resource>` keys are built from.
fn is_key_slug(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "-_.:".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_gate_shaped_and_dotted_names() {
        for name in ["can:archive:event", "reports.export", "audit-log_read"] {
            let input = PermissionInput {
                name: Some(name.to_string()),
            };
            assert_eq!(validate_permission(&input).unwrap().name, name);
        }
    }

    #[test]
    fn missing_name_is_required() {
        let err = validate_permission(&PermissionInput::default()).unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("name")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_uppercase_and_spaces() {
        for bad in ["Can.View", "with space", "emoji🙂"] {
            let input = PermissionInput {
                name: Some(bad.to_string()),
            };
            assert!(validate_permission(&input).is_err(), "{bad:?}");
        }
    }
}
