use std::net::SocketAddr;

use evently_api::app::{AppConfig, build_app};
use evently_api::recaptcha;

#[tokio::main]
async fn main() {
    evently_observability::init();

    let addr = std::env::var("EVENTLY_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });
    let recaptcha_secret = std::env::var("RECAPTCHA_SECRET").unwrap_or_else(|_| {
        tracing::warn!("RECAPTCHA_SECRET not set; captcha verification will always fail");
        String::new()
    });
    let recaptcha_verify_url = std::env::var("RECAPTCHA_VERIFY_URL")
        .unwrap_or_else(|_| recaptcha::GOOGLE_VERIFY_URL.to_string());

    let app = build_app(AppConfig {
        jwt_secret,
        recaptcha_secret,
        recaptcha_verify_url,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    // Connect info feeds the captcha proxy's remote-ip fallback.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
