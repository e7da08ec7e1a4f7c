use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::dto;
use crate::app::services::AppServices;

/// Public landing page: active public events, soonest first, searchable.
pub async fn index(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::NameSearchQuery>,
) -> axum::response::Response {
    let events = services
        .public_events(&query, Utc::now())
        .map(|(event, owner)| dto::event_to_json(&event, owner.as_deref()));

    (StatusCode::OK, Json(serde_json::json!({ "events": events }))).into_response()
}
