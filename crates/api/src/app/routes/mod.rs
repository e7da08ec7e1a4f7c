use axum::{Router, routing::get};

pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod events;
pub mod permissions;
pub mod recaptcha;
pub mod roles;
pub mod system;
pub mod users;
pub mod welcome;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/dashboard", get(dashboard::show))
        .route("/calendar", get(calendar::show))
        .nest("/events", events::router())
        .nest("/users", users::router())
        .nest("/roles", roles::router())
        .nest("/permissions", permissions::router())
}
