use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use evently_auth::{RoleName, check_user_delete, gates};
use evently_core::ExternalId;
use evently_identity::{User, UserInput, validate_user_create, validate_user_update};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<dto::UserListQuery>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::USER_VIEW) {
        return denied;
    }

    let users = services
        .list_users(&query)
        .map(|(user, role)| dto::user_to_json(&user, role.as_deref()));

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "users": users,
            "roles": role_options(&services),
        })),
    )
        .into_response()
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<UserInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::USER_CREATE) {
        return denied;
    }

    let form = match validate_user_create(&body) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let user = match services.store().create_user(&form, None, Utc::now()) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::info!(user = %user.external_id, "user created");
    let role = services.role_name_of(&user);

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User created successfully.",
            "user": dto::user_to_json(&user, role.as_deref()),
        })),
    )
        .into_response()
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::USER_VIEW) {
        return denied;
    }

    let user = match find_user(&services, &id) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let role = services.role_name_of(&user);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user, role.as_deref()),
            "roles": role_options(&services),
        })),
    )
        .into_response()
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<UserInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::USER_UPDATE) {
        return denied;
    }

    let user = match find_user(&services, &id) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let form = match validate_user_update(&body) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let user = match services.store().update_user(user.id, &form, Utc::now()) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let role = services.role_name_of(&user);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "User updated successfully.",
            "user": dto::user_to_json(&user, role.as_deref()),
        })),
    )
        .into_response()
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::USER_DELETE) {
        return denied;
    }

    let user = match find_user(&services, &id) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let target_role = services.role_name_of(&user).map(RoleName::new);
    let check = check_user_delete(current.actor(), user.id, target_role.as_ref());
    if let Err(denied) = authz::enforce(check) {
        return denied;
    }

    if let Err(e) = services.store().delete_user(user.id) {
        return errors::domain_error_to_response(e);
    }
    tracing::info!(user = %user.external_id, "user deleted");

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "User deleted successfully." })),
    )
        .into_response()
}

/// Role catalog for the assignment dropdown.
fn role_options(services: &AppServices) -> Vec<serde_json::Value> {
    services
        .role_catalog()
        .into_iter()
        .map(|(role, _)| {
            serde_json::json!({
                "id": role.id.as_u64(),
                "name": role.name,
            })
        })
        .collect()
}

/// Route keys are external UUIDs; a malformed or unknown key is the same 404.
fn find_user(services: &AppServices, id: &str) -> Result<User, axum::response::Response> {
    let not_found = || errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found");
    let external: ExternalId = id.parse().map_err(|_| not_found())?;
    services
        .store()
        .user_by_external(external)
        .ok_or_else(not_found)
}
