use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;

use evently_auth::{check_event_delete, gates};
use evently_core::ExternalId;
use evently_events::{Event, EventInput, validate_create, validate_update};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/:id", get(get_event).put(update_event).delete(delete_event))
}

pub async fn list_events(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<dto::EventListQuery>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::EVENT_VIEW) {
        return denied;
    }

    let events = services
        .list_events(current.actor(), &query, Utc::now())
        .map(|(event, owner)| dto::event_to_json(&event, owner.as_deref()));

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "events": events,
            "statuses": dto::status_options_json(),
        })),
    )
        .into_response()
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<EventInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::EVENT_CREATE) {
        return denied;
    }

    let now = Utc::now();
    let form = match validate_create(&body, now) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let event = match services.store().create_event(current.user().id, &form, now) {
        Ok(event) => event,
        Err(e) => return errors::domain_error_to_response(e),
    };
    tracing::info!(event = %event.external_id, owner = %current.user().external_id, "event created");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Event created successfully.",
            "event": dto::event_to_json(&event, Some(&current.user().name)),
        })),
    )
        .into_response()
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::EVENT_VIEW) {
        return denied;
    }

    let event = match find_event(&services, &id) {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    let owner = services.store().user(event.user_id).map(|u| u.name);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "event": dto::event_to_json(&event, owner.as_deref()),
            "statuses": dto::status_options_json(),
        })),
    )
        .into_response()
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(body): Json<EventInput>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::EVENT_UPDATE) {
        return denied;
    }

    let event = match find_event(&services, &id) {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    let now = Utc::now();
    let form = match validate_update(&body, event.start_date, now) {
        Ok(form) => form,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let event = match services.store().update_event(event.id, &form, now) {
        Ok(event) => event,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let owner = services.store().user(event.user_id).map(|u| u.name);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Event updated successfully.",
            "event": dto::event_to_json(&event, owner.as_deref()),
        })),
    )
        .into_response()
}

pub async fn delete_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(denied) = authz::require_gate(current.actor(), &gates::EVENT_DELETE) {
        return denied;
    }

    let event = match find_event(&services, &id) {
        Ok(event) => event,
        Err(resp) => return resp,
    };
    if let Err(denied) = authz::enforce(check_event_delete(current.actor(), event.user_id)) {
        return denied;
    }

    if let Err(e) = services.store().delete_event(event.id) {
        return errors::domain_error_to_response(e);
    }
    tracing::info!(event = %event.external_id, "event deleted");

    (
        StatusCode::OK,
        Json(serde_json::json!({ "message": "Event deleted successfully." })),
    )
        .into_response()
}

/// Route keys are external UUIDs; a malformed or unknown key is the same 404.
fn find_event(services: &AppServices, id: &str) -> Result<Event, axum::response::Response> {
    let not_found = || errors::json_error(StatusCode::NOT_FOUND, "not_found", "event not found");
    let external: ExternalId = id.parse().map_err(|_| not_found())?;
    services
        .store()
        .event_by_external(external)
        .ok_or_else(not_found)
}
