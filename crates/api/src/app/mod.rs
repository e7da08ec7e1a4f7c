//! HTTP API application wiring (Axum router + shared state).
//!
//! The folder is structured like:
//! - `services.rs`: shared state (store, token codec, captcha seam) and queries
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get, routing::post};
use chrono::Utc;
use tower::ServiceBuilder;

use evently_auth::TokenCodec;
use evently_store::AppStore;

use crate::middleware;
use crate::recaptcha::{CaptchaVerifier, HttpCaptchaVerifier};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Runtime configuration consumed by [`build_app`].
pub struct AppConfig {
    pub jwt_secret: String,
    pub recaptcha_secret: String,
    pub recaptcha_verify_url: String,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> Router {
    let captcha = Arc::new(HttpCaptchaVerifier::new(
        config.recaptcha_verify_url,
        config.recaptcha_secret,
    ));
    build_app_with_captcha(config.jwt_secret, captcha)
}

/// Router assembly with the captcha verifier injectable for tests.
pub fn build_app_with_captcha(jwt_secret: String, captcha: Arc<dyn CaptchaVerifier>) -> Router {
    let store = Arc::new(AppStore::new());
    evently_store::seed(&store, Utc::now()).expect("failed to seed access control");

    let tokens = Arc::new(TokenCodec::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        tokens: Arc::clone(&tokens),
        store: Arc::clone(&store),
    };

    let services = Arc::new(services::AppServices::new(store, tokens, captcha));

    // Unauthenticated surface: landing page, auth, captcha proxy, health.
    let public = Router::new()
        .route("/", get(routes::welcome::index))
        .route("/health", get(routes::system::health))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/api/recaptcha/verify", post(routes::recaptcha::verify))
        .layer(Extension(Arc::clone(&services)));

    // Protected routes: bearer token required, caller re-resolved per request.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            ))
            .layer(Extension(services)),
    );

    public.merge(protected)
}
