use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use evently_auth::{RoleName, check_role_delete, gates};
use evently_core::RoleId;
use evently_identity::{Role, RoleInput, validate_role_create, validate_role_update};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", get(get_role).put(update_role).delete(delete_role))
}

pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<dto::NameSearchQuery>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::ROLE_VIEW) {
        return denied;
    }

    let roles = services
        .list_roles(&query)
        .map(|(role, permissions)| dto::role_to_json(&role, &permissions));
    let catalog: Vec<_> = services
        .permission_catalog()
        .iter()
        .map(dto::permission_to_json)
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "roles": roles,
            "permissions": catalog,
        })),
    )
        .into_response()
}

pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<RoleInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::ROLE_CREATE) {
        return denied;
    }

    let form = match validate_role_create(&body) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let role = match services.store().create_role(&form, Utc::now()) {
        Ok(role) => role,
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::info!(role = %role.name, "role created");
    let permissions = services.role_permission_pairs(&role);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Role created successfully.",
            "role": dto::role_to_json(&role, &permissions),
        })),
    )
        .into_response()
}

pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::ROLE_VIEW) {
        return denied;
    }

    let role = match find_role(&services, &id) {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    let permissions = services.role_permission_pairs(&role);
    let catalog: Vec<_> = services
        .permission_catalog()
        .iter()
        .map(dto::permission_to_json)
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "role": dto::role_to_json(&role, &permissions),
            "permissions": catalog,
        })),
    )
        .into_response()
}

pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<RoleInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::ROLE_UPDATE) {
        return denied;
    }

    let role = match find_role(&services, &id) {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    let form = match validate_role_update(&body) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let role = match services.store().update_role(role.id, &form, Utc::now()) {
        Ok(role) => role,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let permissions = services.role_permission_pairs(&role);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Role updated successfully.",
            "role": dto::role_to_json(&role, &permissions),
        })),
    )
        .into_response()
}

pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::ROLE_DELETE) {
        return denied;
    }

    let role = match find_role(&services, &id) {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    if let Err(denied) = authz::enforce(check_role_delete(&RoleName::new(role.name.clone()))) {
        return denied;
    }

    if let Err(e) = services.store().delete_role(role.id) {
        return errors::domain_error_to_response(e);
    }
    tracing::info!(role = %role.name, "role deleted");

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Role deleted successfully." })),
    )
        .into_response()
}

/// Role keys are numeric ids; a malformed or unknown key is the same 404.
fn find_role(services: &AppServices, id: &str) -> Result<Role, axum::response::Response> {
    let not_found = || errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found");
    let id: u64 = id.parse().map_err(|_| not_found())?;
    services
        .store()
        .role(RoleId::new(id))
        .ok_or_else(not_found)
}
