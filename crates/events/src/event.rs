use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use evently_core::{DomainError, Entity, EventId, ExternalId, UserId};

/// Lifecycle status of an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Active,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Active => "active",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventStatus::Draft => "Draft",
            EventStatus::Active => "Active",
            EventStatus::Cancelled => "Cancelled",
            EventStatus::Completed => "Completed",
        }
    }

    /// All statuses with display labels, in form order.
    pub fn options() -> [EventStatus; 4] {
        [
            EventStatus::Draft,
            EventStatus::Active,
            EventStatus::Cancelled,
            EventStatus::Completed,
        ]
    }
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Draft
    }
}

impl core::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EventStatus::Draft),
            "active" => Ok(EventStatus::Active),
            "cancelled" => Ok(EventStatus::Cancelled),
            "completed" => Ok(EventStatus::Completed),
            other => Err(DomainError::invalid_id(format!(
                "EventStatus: unknown status '{other}'"
            ))),
        }
    }
}

/// An event record.
///
/// `id` is the arena key; `external_id` is the route key exposed in URLs.
/// Ownership is a plain foreign key to the user arena; deleting the owner
/// deletes the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub external_id: ExternalId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub max_attendees: Option<u32>,
    pub is_public: bool,
    pub status: EventStatus,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Public events in `active` status are the ones shown on the landing
    /// page without authentication.
    pub fn is_publicly_listed(&self) -> bool {
        self.is_public && self.status == EventStatus::Active
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> EventId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_its_own_wire_form() {
        for status in EventStatus::options() {
            assert_eq!(status.as_str().parse::<EventStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown_values() {
        assert!("archived".parse::<EventStatus>().is_err());
        assert!("Draft".parse::<EventStatus>().is_err());
    }

    #[test]
    fn public_listing_requires_public_and_active() {
        let base = Event {
            id: EventId::new(1),
            external_id: ExternalId::new(),
            title: "Meetup".to_string(),
            description: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            location: None,
            max_attendees: None,
            is_public: true,
            status: EventStatus::Active,
            user_id: UserId::new(1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(base.is_publicly_listed());

        let draft = Event {
            status: EventStatus::Draft,
            ..base.clone()
        };
        assert!(!draft.is_publicly_listed());

        let private_event = Event {
            is_public: false,
            ..base
        };
        assert!(!private_event.is_publicly_listed());
    }
}
