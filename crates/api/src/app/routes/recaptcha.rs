use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Extension},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use evently_core::DomainError;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

/// Proxy to the reCAPTCHA verification endpoint.
///
/// The outcome is always one of three fixed bodies; the upstream error is
/// logged, never forwarded.
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
    connect: Option<ConnectInfo<SocketAddr>>,
    Json(body): Json<dto::VerifyCaptchaRequest>,
) -> axum::response::Response {
    let token = body
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        return errors::domain_error_to_response(DomainError::validation(
            "token",
            "The token field is required.",
        ));
    };

    let remote_ip = client_ip(&headers, connect.as_ref());
    match services.captcha().verify(token, remote_ip.as_deref()).await {
        Ok(true) => (StatusCode::OK, Json(serde_json::json!({ "verified": true }))).into_response(),
        Ok(false) => {
            tracing::warn!("recaptcha verification rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "verified": false,
                    "message": "reCAPTCHA verification failed",
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "recaptcha verification errored");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "verified": false,
                    "message": "Error verifying reCAPTCHA",
                })),
            )
                .into_response()
        }
    }
}

/// Best-effort client address: first `X-Forwarded-For` hop, else the socket
/// peer when the server was built with connect info.
fn client_ip(headers: &HeaderMap, connect: Option<&ConnectInfo<SocketAddr>>) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().map(str::trim);
        if let Some(ip) = first.filter(|s| !s.is_empty()) {
            return Some(ip.to_string());
        }
    }
    connect.map(|ConnectInfo(addr)| addr.ip().to_string())
}
