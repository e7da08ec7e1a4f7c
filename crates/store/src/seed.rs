//! First-boot records: the permission catalog, the system roles, and the
//! default admin account.
//!
//! Runs on every startup. Existing records are kept; the system roles' grant
//! sets are re-synced to the canonical sets, so a tampered grant heals on the
//! next boot.

use chrono::{DateTime, Utc};

use evently_auth::{RoleName, gates};
use evently_core::DomainResult;
use evently_identity::{
    PermissionSync, RoleChange, ValidatedPermission, ValidatedRoleCreate, ValidatedRoleUpdate,
    ValidatedUserCreate, ValidatedUserUpdate,
};

use crate::AppStore;

pub const ADMIN_NAME: &str = "Admin";
pub const ADMIN_EMAIL: &str = "admin@gmail.com";
pub const ADMIN_PASSWORD: &str = "abcd1234";

pub fn seed(store: &AppStore, now: DateTime<Utc>) -> DomainResult<()> {
    for key in gates::ALL {
        ensure_permission(store, key.as_str(), now)?;
    }

    sync_role(
        store,
        RoleName::ADMIN.as_str(),
        gates::ALL.iter().map(|k| k.as_str().to_string()).collect(),
        now,
    )?;
    sync_role(
        store,
        RoleName::USER.as_str(),
        gates::EVENT_GATES
            .iter()
            .map(|k| k.as_str().to_string())
            .collect(),
        now,
    )?;

    ensure_admin_account(store, now)?;

    tracing::info!(
        permissions = gates::ALL.len(),
        admin = ADMIN_EMAIL,
        "access control seeded"
    );
    Ok(())
}

fn ensure_permission(store: &AppStore, name: &str, now: DateTime<Utc>) -> DomainResult<()> {
    if store.permission_by_name(name).is_none() {
        store.create_permission(
            &ValidatedPermission {
                name: name.to_string(),
            },
            now,
        )?;
    }
    Ok(())
}

/// Create the role if missing, then set its grants to exactly `permissions`.
fn sync_role(
    store: &AppStore,
    name: &str,
    permissions: Vec<String>,
    now: DateTime<Utc>,
) -> DomainResult<()> {
    match store.role_by_name(name) {
        Some(role) => {
            store.update_role(
                role.id,
                &ValidatedRoleUpdate {
                    name: name.to_string(),
                    permissions: PermissionSync::Set(permissions),
                },
                now,
            )?;
        }
        None => {
            store.create_role(
                &ValidatedRoleCreate {
                    name: name.to_string(),
                    permissions,
                },
                now,
            )?;
        }
    }
    Ok(())
}

/// The admin account starts unverified; verification is a login-time concern
/// the seeder stays out of.
fn ensure_admin_account(store: &AppStore, now: DateTime<Utc>) -> DomainResult<()> {
    let admin_role = store
        .role_by_name(RoleName::ADMIN.as_str())
        .ok_or_else(evently_core::DomainError::not_found)?;

    match store.user_by_email(ADMIN_EMAIL) {
        Some(user) if user.role_id == Some(admin_role.id) => Ok(()),
        Some(user) => {
            let update = ValidatedUserUpdate {
                name: user.name.clone(),
                email: user.email.clone(),
                password: None,
                role: RoleChange::Assign(RoleName::ADMIN.as_str().to_string()),
            };
            store.update_user(user.id, &update, now)?;
            Ok(())
        }
        None => {
            store.create_user(
                &ValidatedUserCreate {
                    name: ADMIN_NAME.to_string(),
                    email: ADMIN_EMAIL.to_string(),
                    password: ADMIN_PASSWORD.to_string(),
                    role: Some(RoleName::ADMIN.as_str().to_string()),
                },
                None,
                now,
            )?;
            Ok(())
        }
    }
}
