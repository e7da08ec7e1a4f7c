use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};

use evently_auth::{can, gates};

use crate::app::dto;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// Scoped calendar feed: everything the caller may see, ascending by start.
pub async fn show(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> axum::response::Response {
    let events: Vec<_> = services
        .calendar(current.actor())
        .into_iter()
        .map(|entry| {
            dto::calendar_entry_to_json(&entry.event, entry.owner_name.as_deref(), entry.is_owner)
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "events": events,
            "can_create_events": can(current.actor(), &gates::EVENT_CREATE),
        })),
    )
        .into_response()
}
