//! Identity domain module (users, roles, permissions).
//!
//! Stored record shapes plus their form validation and password hashing.
//!
//! Access decisions live in `evently-auth`; this crate only defines what an
//! account, a role and a permission *are* and which inputs are acceptable.

pub mod password;
pub mod permission;
pub mod role;
pub mod user;

mod serde_util;

pub use password::{hash_password, verify_password};
pub use permission::{Permission, PermissionInput, ValidatedPermission, validate_permission};
pub use role::{
    PermissionSync, Role, RoleInput, ValidatedRoleCreate, ValidatedRoleUpdate, validate_role_create,
    validate_role_update,
};
pub use user::{
    RoleChange, User, UserInput, ValidatedUserCreate, ValidatedUserUpdate, validate_user_create,
    validate_user_update,
};
