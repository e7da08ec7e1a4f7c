use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use evently_auth::gates;
use evently_core::PermissionId;
use evently_identity::{Permission, PermissionInput, validate_permission};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route(
            "/:id",
            get(get_permission)
                .put(update_permission)
                .delete(delete_permission),
        )
}

pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<dto::NameSearchQuery>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::PERMISSION_VIEW) {
        return denied;
    }

    let permissions = services
        .list_permissions(&query)
        .map(|p| dto::permission_to_json(&p));

    (
        StatusCode::OK,
        Json(serde_json::json!({ "permissions": permissions })),
    )
        .into_response()
}

pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<PermissionInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::PERMISSION_CREATE) {
        return denied;
    }

    let form = match validate_permission(&body) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let permission = match services.store().create_permission(&form, Utc::now()) {
        Ok(permission) => permission,
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::info!(permission = %permission.name, "permission created");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Permission created successfully.",
            "permission": dto::permission_to_json(&permission),
        })),
    )
        .into_response()
}

pub async fn get_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::PERMISSION_VIEW) {
        return denied;
    }

    let permission = match find_permission(&services, &id) {
        Ok(permission) => permission,
        Err(resp) => return resp,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({ "permission": dto::permission_to_json(&permission) })),
    )
        .into_response()
}

pub async fn update_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<PermissionInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::PERMISSION_UPDATE) {
        return denied;
    }

    let permission = match find_permission(&services, &id) {
        Ok(permission) => permission,
        Err(resp) => return resp,
    };
    let form = match validate_permission(&body) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let permission = match services
        .store()
        .update_permission(permission.id, &form, Utc::now())
    {
        Ok(permission) => permission,
        Err(e) => return errors::domain_error_to_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Permission updated successfully.",
            "permission": dto::permission_to_json(&permission),
        })),
    )
        .into_response()
}

pub async fn delete_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::PERMISSION_DELETE) {
        return denied;
    }

    let permission = match find_permission(&services, &id) {
        Ok(permission) => permission,
        Err(resp) => return resp,
    };
    if let Err(e) = services.store().delete_permission(permission.id) {
        return errors::domain_error_to_response(e);
    }
    tracing::info!(permission = %permission.name, "permission deleted");

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Permission deleted successfully." })),
    )
        .into_response()
}

/// Permission keys are numeric ids; a malformed or unknown key is the same 404.
fn find_permission(
    services: &AppServices,
    id: &str,
) -> Result<Permission, axum::response::Response> {
    let not_found =
        || errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found");
    let id: u64 = id.parse().map_err(|_| not_found())?;
    services
        .store()
        .permission(PermissionId::new(id))
        .ok_or_else(not_found)
}
