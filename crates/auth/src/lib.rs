//! `evently-auth` — pure authorization boundary.
//!
//! Every access decision reduces to set membership over permission keys held
//! by the caller's role, plus a short list of named protection rules for
//! destructive actions. This crate is intentionally decoupled from HTTP and
//! storage: callers resolve an [`Actor`] from whatever they persist, then ask
//! questions about it.

pub mod claims;
pub mod evaluate;
pub mod permissions;
pub mod protection;
pub mod roles;
pub mod scope;

pub use claims::{AuthClaims, TokenCodec, TokenError, validate_claims};
pub use evaluate::{Actor, AuthzError, can, require};
pub use permissions::{PermissionKey, gates};
pub use protection::{DenyReason, check_event_delete, check_role_delete, check_user_delete};
pub use roles::RoleName;
pub use scope::EventScope;
