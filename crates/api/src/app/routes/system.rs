use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::context::CurrentUser;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    axum::extract::Extension(current): axum::extract::Extension<CurrentUser>,
) -> impl IntoResponse {
    let mut permissions: Vec<&str> = current
        .actor()
        .permissions
        .iter()
        .map(|k| k.as_str())
        .collect();
    permissions.sort_unstable();

    Json(serde_json::json!({
        "uuid": current.user().external_id.to_string(),
        "name": current.user().name,
        "email": current.user().email,
        "role": current.actor().role.as_ref().map(|r| r.as_str()),
        "permissions": permissions,
    }))
}
