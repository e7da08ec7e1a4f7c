use serde::Deserialize;
use serde_json::{Value, json};

use evently_events::{DateFilter, Event, EventStatus, Visibility};
use evently_identity::{Permission, Role, User};

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub visibility: Option<String>,
    pub date_filter: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub verified: Option<String>,
    pub role: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Shared by the role, permission and public listings.
#[derive(Debug, Default, Deserialize)]
pub struct NameSearchQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub status_filter: Option<String>,
    pub period: Option<String>,
}

/// Unrecognized `visibility` values apply no constraint.
pub fn parse_visibility(raw: &str) -> Option<Visibility> {
    match raw {
        "public" => Some(Visibility::Public),
        "private" => Some(Visibility::Private),
        _ => None,
    }
}

/// Unrecognized `date_filter` values apply no constraint.
pub fn parse_date_filter(raw: &str) -> Option<DateFilter> {
    match raw {
        "upcoming" => Some(DateFilter::Upcoming),
        "ongoing" => Some(DateFilter::Ongoing),
        "past" => Some(DateFilter::Past),
        _ => None,
    }
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct VerifyCaptchaRequest {
    pub token: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn event_to_json(event: &Event, owner_name: Option<&str>) -> Value {
    json!({
        "id": event.id,
        "uuid": event.external_id.to_string(),
        "title": event.title,
        "description": event.description,
        "start_date": event.start_date,
        "end_date": event.end_date,
        "location": event.location,
        "max_attendees": event.max_attendees,
        "is_public": event.is_public,
        "status": event.status.as_str(),
        "user_id": event.user_id,
        "user_name": owner_name,
        "created_at": event.created_at,
        "updated_at": event.updated_at,
    })
}

/// Calendar shape: `start`/`end` keys and the caller-relative `is_owner` flag.
pub fn calendar_entry_to_json(event: &Event, owner_name: Option<&str>, is_owner: bool) -> Value {
    json!({
        "id": event.id,
        "uuid": event.external_id.to_string(),
        "title": event.title,
        "start": event.start_date,
        "end": event.end_date,
        "description": event.description,
        "location": event.location,
        "max_attendees": event.max_attendees,
        "is_public": event.is_public,
        "status": event.status.as_str(),
        "user_name": owner_name,
        "is_owner": is_owner,
    })
}

pub fn user_to_json(user: &User, role_name: Option<&str>) -> Value {
    json!({
        "id": user.id,
        "uuid": user.external_id.to_string(),
        "name": user.name,
        "email": user.email,
        "email_verified_at": user.email_verified_at,
        "role": role_name,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
    })
}

/// `permissions` carries resolved `{id, name}` pairs so clients can submit
/// names back on sync.
pub fn role_to_json(role: &Role, permissions: &[(u64, String)]) -> Value {
    json!({
        "id": role.id,
        "name": role.name,
        "permissions": permissions
            .iter()
            .map(|(id, name)| json!({ "id": id, "name": name }))
            .collect::<Vec<_>>(),
        "created_at": role.created_at,
        "updated_at": role.updated_at,
    })
}

pub fn permission_to_json(permission: &Permission) -> Value {
    json!({
        "id": permission.id,
        "name": permission.name,
        "guard_name": permission.guard,
        "created_at": permission.created_at,
        "updated_at": permission.updated_at,
    })
}

pub fn status_options_json() -> Value {
    Value::Array(
        EventStatus::options()
            .iter()
            .map(|status| json!({ "value": status.as_str(), "label": status.label() }))
            .collect(),
    )
}
