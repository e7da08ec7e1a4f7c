//! HTTP-side authorization guards.
//!
//! Handlers call these before any other logic; a denial short-circuits into
//! the JSON error shape. Permission gates come first, protection rules after.

use axum::http::StatusCode;

use evently_auth::{Actor, DenyReason, PermissionKey, require};

use crate::app::errors;

/// Gate a handler on a single permission key. Fail-closed 403.
pub fn require_gate(
    actor: &Actor,
    gate: &PermissionKey,
) -> Result<(), axum::response::Response> {
    require(actor, gate)
        .map_err(|e| errors::json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

/// Turn a protection-rule denial into the 403 the route returns.
pub fn enforce(check: Result<(), DenyReason>) -> Result<(), axum::response::Response> {
    check.map_err(|reason| {
        errors::json_error(StatusCode::FORBIDDEN, "forbidden", reason.message())
    })
}
