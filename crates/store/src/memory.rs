//! The in-memory store of record.

use std::collections::BTreeSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use evently_auth::{Actor, PermissionKey, RoleName};
use evently_core::{
    DomainError, DomainResult, EventId, ExternalId, PermissionId, RoleId, UserId, ValidationErrors,
};
use evently_events::{Event, ValidatedEvent};
use evently_identity::{
    Permission, PermissionSync, Role, RoleChange, User, ValidatedPermission, ValidatedRoleCreate,
    ValidatedRoleUpdate, ValidatedUserCreate, ValidatedUserUpdate, hash_password,
};

use crate::arena::Arena;

#[derive(Debug, Default)]
struct StoreState {
    users: Arena<User>,
    roles: Arena<Role>,
    permissions: Arena<Permission>,
    events: Arena<Event>,
}

impl StoreState {
    fn email_taken(&self, email: &str, ignore: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| Some(u.id) != ignore && u.email.eq_ignore_ascii_case(email))
    }

    fn role_name_taken(&self, name: &str, ignore: Option<RoleId>) -> bool {
        self.roles
            .iter()
            .any(|r| Some(r.id) != ignore && r.name == name)
    }

    fn permission_name_taken(&self, name: &str, ignore: Option<PermissionId>) -> bool {
        self.permissions
            .iter()
            .any(|p| Some(p.id) != ignore && p.name == name)
    }

    fn role_id_by_name(&self, name: &str) -> Option<RoleId> {
        self.roles.iter().find(|r| r.name == name).map(|r| r.id)
    }

    /// Resolve permission names to ids, reporting every unknown name.
    fn resolve_permission_names(
        &self,
        names: &[String],
        errors: &mut ValidationErrors,
    ) -> BTreeSet<PermissionId> {
        let mut ids = BTreeSet::new();
        for name in names {
            match self.permissions.iter().find(|p| &p.name == name) {
                Some(p) => {
                    ids.insert(p.id);
                }
                None => errors.add("permissions", "The permission must exist."),
            }
        }
        ids
    }
}

/// Arena-of-records store behind one `RwLock`.
///
/// Every mutation takes the write lock for its whole check-then-commit
/// sequence, which is what makes the uniqueness checks race-free.
#[derive(Debug, Default)]
pub struct AppStore {
    inner: RwLock<StoreState>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, StoreState>> {
        self.inner
            .read()
            .map_err(|_| DomainError::internal("store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, StoreState>> {
        self.inner
            .write()
            .map_err(|_| DomainError::internal("store lock poisoned"))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_user(
        &self,
        form: &ValidatedUserCreate,
        email_verified_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        // Hash outside the lock; bcrypt is deliberately slow.
        let password_hash = hash_password(&form.password)?;

        let mut state = self.write()?;
        let mut errors = ValidationErrors::new();
        if state.email_taken(&form.email, None) {
            errors.add("email", "The user email must be unique.");
        }
        let role_id = match &form.role {
            Some(name) => match state.role_id_by_name(name) {
                Some(id) => Some(id),
                None => {
                    errors.add("role", "The user role must exist.");
                    None
                }
            },
            None => None,
        };
        errors.into_result()?;

        let user = state.users.insert_with(|id| User {
            id,
            external_id: ExternalId::new(),
            name: form.name.clone(),
            email: form.email.clone(),
            password_hash: password_hash.clone(),
            email_verified_at,
            role_id,
            created_at: now,
            updated_at: now,
        });
        Ok(user.clone())
    }

    pub fn update_user(
        &self,
        id: UserId,
        form: &ValidatedUserUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<User> {
        let password_hash = match &form.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let mut state = self.write()?;
        if state.users.get(id).is_none() {
            return Err(DomainError::not_found());
        }

        let mut errors = ValidationErrors::new();
        if state.email_taken(&form.email, Some(id)) {
            errors.add("email", "The user email must be unique.");
        }
        let role_change = match &form.role {
            RoleChange::Keep => None,
            RoleChange::Clear => Some(None),
            RoleChange::Assign(name) => match state.role_id_by_name(name) {
                Some(role_id) => Some(Some(role_id)),
                None => {
                    errors.add("role", "The user role must exist.");
                    None
                }
            },
        };
        errors.into_result()?;

        let user = state
            .users
            .get_mut(id)
            .ok_or_else(DomainError::not_found)?;
        user.name = form.name.clone();
        user.email = form.email.clone();
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(role_id) = role_change {
            user.role_id = role_id;
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    /// Remove a user and cascade-delete their events.
    pub fn delete_user(&self, id: UserId) -> DomainResult<User> {
        let mut state = self.write()?;
        let user = state.users.remove(id).ok_or_else(DomainError::not_found)?;
        state.events.retain(|e| e.user_id != id);
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.read().ok()?.users.get(id).cloned()
    }

    pub fn user_by_external(&self, external_id: ExternalId) -> Option<User> {
        self.read()
            .ok()?
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.read()
            .ok()?
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn users(&self) -> Vec<User> {
        match self.read() {
            Ok(state) => state.users.snapshot(),
            Err(_) => Vec::new(),
        }
    }

    /// Resolve the authorization view of a user: role name plus that role's
    /// permission keys. Re-run per request so grant edits apply immediately.
    pub fn actor(&self, user: &User) -> Actor {
        let state = match self.read() {
            Ok(state) => state,
            Err(_) => return Actor::without_role(user.id),
        };
        let role = user.role_id.and_then(|id| state.roles.get(id));
        match role {
            Some(role) => {
                let permissions = role
                    .permissions
                    .iter()
                    .filter_map(|pid| state.permissions.get(*pid))
                    .map(|p| PermissionKey::new(p.name.clone()))
                    .collect();
                Actor::new(user.id, Some(RoleName::new(role.name.clone())), permissions)
            }
            None => Actor::without_role(user.id),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_role(&self, form: &ValidatedRoleCreate, now: DateTime<Utc>) -> DomainResult<Role> {
        let mut state = self.write()?;
        let mut errors = ValidationErrors::new();
        if state.role_name_taken(&form.name, None) {
            errors.add("name", "The role name must be unique.");
        }
        let permissions = state.resolve_permission_names(&form.permissions, &mut errors);
        errors.into_result()?;

        let role = state.roles.insert_with(|id| Role {
            id,
            name: form.name.clone(),
            permissions: permissions.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(role.clone())
    }

    pub fn update_role(
        &self,
        id: RoleId,
        form: &ValidatedRoleUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Role> {
        let mut state = self.write()?;
        if state.roles.get(id).is_none() {
            return Err(DomainError::not_found());
        }

        let mut errors = ValidationErrors::new();
        if state.role_name_taken(&form.name, Some(id)) {
            errors.add("name", "The role name must be unique.");
        }
        let permissions = match &form.permissions {
            PermissionSync::Keep => None,
            PermissionSync::Set(names) => {
                Some(state.resolve_permission_names(names, &mut errors))
            }
        };
        errors.into_result()?;

        let role = state
            .roles
            .get_mut(id)
            .ok_or_else(DomainError::not_found)?;
        role.name = form.name.clone();
        if let Some(permissions) = permissions {
            role.permissions = permissions;
        }
        role.updated_at = now;
        Ok(role.clone())
    }

    /// Remove a role and clear it from every user holding it.
    pub fn delete_role(&self, id: RoleId) -> DomainResult<Role> {
        let mut state = self.write()?;
        let role = state.roles.remove(id).ok_or_else(DomainError::not_found)?;
        for user in state.users.iter_mut() {
            if user.role_id == Some(id) {
                user.role_id = None;
            }
        }
        Ok(role)
    }

    pub fn role(&self, id: RoleId) -> Option<Role> {
        self.read().ok()?.roles.get(id).cloned()
    }

    pub fn role_by_name(&self, name: &str) -> Option<Role> {
        self.read()
            .ok()?
            .roles
            .iter()
            .find(|r| r.name == name)
            .cloned()
    }

    pub fn roles(&self) -> Vec<Role> {
        match self.read() {
            Ok(state) => state.roles.snapshot(),
            Err(_) => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_permission(
        &self,
        form: &ValidatedPermission,
        now: DateTime<Utc>,
    ) -> DomainResult<Permission> {
        let mut state = self.write()?;
        if state.permission_name_taken(&form.name, None) {
            return Err(DomainError::validation(
                "name",
                "The permission name must be unique.",
            ));
        }
        let permission = state.permissions.insert_with(|id| Permission {
            id,
            name: form.name.clone(),
            guard: Permission::DEFAULT_GUARD.to_string(),
            created_at: now,
            updated_at: now,
        });
        Ok(permission.clone())
    }

    /// Rename a permission. Role associations are by id and survive; the
    /// grant's meaning follows the new name on the next evaluation.
    pub fn update_permission(
        &self,
        id: PermissionId,
        form: &ValidatedPermission,
        now: DateTime<Utc>,
    ) -> DomainResult<Permission> {
        let mut state = self.write()?;
        if state.permissions.get(id).is_none() {
            return Err(DomainError::not_found());
        }
        if state.permission_name_taken(&form.name, Some(id)) {
            return Err(DomainError::validation(
                "name",
                "The permission name must be unique.",
            ));
        }
        let permission = state
            .permissions
            .get_mut(id)
            .ok_or_else(DomainError::not_found)?;
        permission.name = form.name.clone();
        permission.updated_at = now;
        Ok(permission.clone())
    }

    /// Remove a permission and detach it from every role.
    pub fn delete_permission(&self, id: PermissionId) -> DomainResult<Permission> {
        let mut state = self.write()?;
        let permission = state
            .permissions
            .remove(id)
            .ok_or_else(DomainError::not_found)?;
        for role in state.roles.iter_mut() {
            role.permissions.remove(&id);
        }
        Ok(permission)
    }

    pub fn permission(&self, id: PermissionId) -> Option<Permission> {
        self.read().ok()?.permissions.get(id).cloned()
    }

    pub fn permission_by_name(&self, name: &str) -> Option<Permission> {
        self.read()
            .ok()?
            .permissions
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    pub fn permissions(&self) -> Vec<Permission> {
        match self.read() {
            Ok(state) => state.permissions.snapshot(),
            Err(_) => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_event(
        &self,
        owner: UserId,
        form: &ValidatedEvent,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        let mut state = self.write()?;
        if state.users.get(owner).is_none() {
            return Err(DomainError::unauthorized("account no longer exists"));
        }
        let event = state.events.insert_with(|id| Event {
            id,
            external_id: ExternalId::new(),
            title: form.title.clone(),
            description: form.description.clone(),
            start_date: form.start_date,
            end_date: form.end_date,
            location: form.location.clone(),
            max_attendees: form.max_attendees,
            is_public: form.is_public,
            status: form.status,
            user_id: owner,
            created_at: now,
            updated_at: now,
        });
        Ok(event.clone())
    }

    pub fn update_event(
        &self,
        id: EventId,
        form: &ValidatedEvent,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        let mut state = self.write()?;
        let event = state
            .events
            .get_mut(id)
            .ok_or_else(DomainError::not_found)?;
        event.title = form.title.clone();
        event.description = form.description.clone();
        event.start_date = form.start_date;
        event.end_date = form.end_date;
        event.location = form.location.clone();
        event.max_attendees = form.max_attendees;
        event.is_public = form.is_public;
        event.status = form.status;
        event.updated_at = now;
        Ok(event.clone())
    }

    pub fn delete_event(&self, id: EventId) -> DomainResult<Event> {
        let mut state = self.write()?;
        state.events.remove(id).ok_or_else(DomainError::not_found)
    }

    pub fn event_by_external(&self, external_id: ExternalId) -> Option<Event> {
        self.read()
            .ok()?
            .events
            .iter()
            .find(|e| e.external_id == external_id)
            .cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        match self.read() {
            Ok(state) => state.events.snapshot(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evently_events::EventStatus;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn user_form(name: &str, email: &str, role: Option<&str>) -> ValidatedUserCreate {
        ValidatedUserCreate {
            name: name.to_string(),
            email: email.to_string(),
            password: "abcd1234".to_string(),
            role: role.map(str::to_string),
        }
    }

    fn event_form(title: &str, is_public: bool) -> ValidatedEvent {
        let start = now() + chrono::Duration::days(1);
        ValidatedEvent {
            title: title.to_string(),
            description: None,
            start_date: start,
            end_date: start + chrono::Duration::hours(2),
            location: None,
            max_attendees: None,
            is_public,
            status: EventStatus::Active,
        }
    }

    fn permission_named(store: &AppStore, name: &str) -> Permission {
        store
            .create_permission(
                &ValidatedPermission {
                    name: name.to_string(),
                },
                now(),
            )
            .unwrap()
    }

    #[test]
    fn duplicate_email_is_a_field_validation_failure() {
        let store = AppStore::new();
        store
            .create_user(&user_form("A", "a@example.com", None), None, now())
            .unwrap();

        let err = store
            .create_user(&user_form("B", "A@Example.COM", None), None, now())
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("email")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn update_ignores_own_email_for_uniqueness() {
        let store = AppStore::new();
        let user = store
            .create_user(&user_form("A", "a@example.com", None), None, now())
            .unwrap();

        let update = ValidatedUserUpdate {
            name: "A renamed".to_string(),
            email: "a@example.com".to_string(),
            password: None,
            role: RoleChange::Keep,
        };
        let updated = store.update_user(user.id, &update, now()).unwrap();
        assert_eq!(updated.name, "A renamed");
    }

    #[test]
    fn assigning_an_unknown_role_fails() {
        let store = AppStore::new();
        let err = store
            .create_user(&user_form("A", "a@example.com", Some("ghost")), None, now())
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("role")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn role_create_resolves_permission_names_and_rejects_unknown() {
        let store = AppStore::new();
        permission_named(&store, "can:view:event");

        let ok = store
            .create_role(
                &ValidatedRoleCreate {
                    name: "editor".to_string(),
                    permissions: vec!["can:view:event".to_string()],
                },
                now(),
            )
            .unwrap();
        assert_eq!(ok.permissions.len(), 1);

        let err = store
            .create_role(
                &ValidatedRoleCreate {
                    name: "ghostly".to_string(),
                    permissions: vec!["can:levitate:user".to_string()],
                },
                now(),
            )
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("permissions")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn role_update_syncs_the_permission_set() {
        let store = AppStore::new();
        let view = permission_named(&store, "can:view:event");
        permission_named(&store, "can:create:event");

        let role = store
            .create_role(
                &ValidatedRoleCreate {
                    name: "editor".to_string(),
                    permissions: vec![
                        "can:view:event".to_string(),
                        "can:create:event".to_string(),
                    ],
                },
                now(),
            )
            .unwrap();
        assert_eq!(role.permissions.len(), 2);

        let narrowed = store
            .update_role(
                role.id,
                &ValidatedRoleUpdate {
                    name: "editor".to_string(),
                    permissions: PermissionSync::Set(vec!["can:view:event".to_string()]),
                },
                now(),
            )
            .unwrap();
        assert_eq!(narrowed.permissions, BTreeSet::from([view.id]));

        let cleared = store
            .update_role(
                role.id,
                &ValidatedRoleUpdate {
                    name: "editor".to_string(),
                    permissions: PermissionSync::Set(Vec::new()),
                },
                now(),
            )
            .unwrap();
        assert!(cleared.permissions.is_empty());

        let kept = store
            .update_role(
                role.id,
                &ValidatedRoleUpdate {
                    name: "editor-renamed".to_string(),
                    permissions: PermissionSync::Keep,
                },
                now(),
            )
            .unwrap();
        assert!(kept.permissions.is_empty());
        assert_eq!(kept.name, "editor-renamed");
    }

    #[test]
    fn renaming_a_permission_keeps_role_associations() {
        let store = AppStore::new();
        let permission = permission_named(&store, "can:view:event");
        let role = store
            .create_role(
                &ValidatedRoleCreate {
                    name: "editor".to_string(),
                    permissions: vec!["can:view:event".to_string()],
                },
                now(),
            )
            .unwrap();

        store
            .update_permission(
                permission.id,
                &ValidatedPermission {
                    name: "can:observe:event".to_string(),
                },
                now(),
            )
            .unwrap();

        let role = store.role(role.id).unwrap();
        assert_eq!(role.permissions, BTreeSet::from([permission.id]));
    }

    #[test]
    fn deleting_a_permission_detaches_it_from_roles() {
        let store = AppStore::new();
        let permission = permission_named(&store, "can:view:event");
        let role = store
            .create_role(
                &ValidatedRoleCreate {
                    name: "editor".to_string(),
                    permissions: vec!["can:view:event".to_string()],
                },
                now(),
            )
            .unwrap();

        store.delete_permission(permission.id).unwrap();
        assert!(store.role(role.id).unwrap().permissions.is_empty());
    }

    #[test]
    fn deleting_a_role_detaches_it_from_users() {
        let store = AppStore::new();
        let role = store
            .create_role(
                &ValidatedRoleCreate {
                    name: "editor".to_string(),
                    permissions: Vec::new(),
                },
                now(),
            )
            .unwrap();
        let user = store
            .create_user(&user_form("A", "a@example.com", Some("editor")), None, now())
            .unwrap();
        assert_eq!(user.role_id, Some(role.id));

        store.delete_role(role.id).unwrap();
        assert_eq!(store.user(user.id).unwrap().role_id, None);
    }

    #[test]
    fn deleting_a_user_cascades_to_their_events() {
        let store = AppStore::new();
        let a = store
            .create_user(&user_form("A", "a@example.com", None), None, now())
            .unwrap();
        let b = store
            .create_user(&user_form("B", "b@example.com", None), None, now())
            .unwrap();
        store.create_event(a.id, &event_form("A's", false), now()).unwrap();
        store.create_event(b.id, &event_form("B's", false), now()).unwrap();

        store.delete_user(a.id).unwrap();

        let remaining = store.events();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].user_id, b.id);
    }

    #[test]
    fn actor_resolution_follows_role_grants() {
        let store = AppStore::new();
        permission_named(&store, "can:view:event");
        store
            .create_role(
                &ValidatedRoleCreate {
                    name: "viewer".to_string(),
                    permissions: vec!["can:view:event".to_string()],
                },
                now(),
            )
            .unwrap();
        let user = store
            .create_user(&user_form("A", "a@example.com", Some("viewer")), None, now())
            .unwrap();

        let actor = store.actor(&user);
        assert_eq!(actor.role, Some(RoleName::new("viewer")));
        assert!(actor.permissions.contains(&PermissionKey::new("can:view:event")));
        assert!(!actor.is_admin());

        let role_less = store
            .create_user(&user_form("B", "b@example.com", None), None, now())
            .unwrap();
        let actor = store.actor(&role_less);
        assert_eq!(actor.role, None);
        assert!(actor.permissions.is_empty());
    }

    #[test]
    fn permission_uniqueness_is_enforced() {
        let store = AppStore::new();
        permission_named(&store, "can:archive:event");

        let err = store
            .create_permission(
                &ValidatedPermission {
                    name: "can:archive:event".to_string(),
                },
                now(),
            )
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("name")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn event_update_and_delete_round_trip() {
        let store = AppStore::new();
        let user = store
            .create_user(&user_form("A", "a@example.com", None), None, now())
            .unwrap();
        let event = store
            .create_event(user.id, &event_form("Original", false), now())
            .unwrap();

        let mut changed = event_form("Renamed", true);
        changed.status = EventStatus::Cancelled;
        let updated = store.update_event(event.id, &changed, now()).unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.status, EventStatus::Cancelled);
        assert_eq!(updated.external_id, event.external_id);

        store.delete_event(event.id).unwrap();
        assert_eq!(store.delete_event(event.id).unwrap_err(), DomainError::NotFound);
    }
}
