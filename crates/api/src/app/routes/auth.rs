use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};

use evently_identity::{User, UserInput};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

/// Self-service signup. The submitted role, if any, is ignored; every
/// registration gets the `user` role and counts as verified.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<UserInput>,
) -> axum::response::Response {
    let now = Utc::now();
    let user = match services.register(&body, now) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::info!(user = %user.external_id, "account registered");

    token_response(&services, &user, now, StatusCode::CREATED)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let Some(user) = services.authenticate(&body.email, &body.password) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "These credentials do not match our records.",
        );
    };

    token_response(&services, &user, Utc::now(), StatusCode::OK)
}

fn token_response(
    services: &AppServices,
    user: &User,
    now: DateTime<Utc>,
    status: StatusCode,
) -> axum::response::Response {
    let token = match services.issue_token(user, now) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token issuance failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            );
        }
    };
    let role = services.role_name_of(user);

    (
        status,
        Json(serde_json::json!({
            "token": token,
            "user": dto::user_to_json(user, role.as_deref()),
        })),
    )
        .into_response()
}
