//! Event form validation.
//!
//! All rules run on every submission and failures are reported together,
//! keyed by field. Inputs are trimmed first and empty optional strings are
//! treated as absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evently_core::{DomainError, DomainResult, ValidationErrors};

use crate::event::EventStatus;

/// Raw event form payload, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub max_attendees: Option<i64>,
    pub is_public: Option<bool>,
    pub status: Option<String>,
}

/// Event form after validation, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub max_attendees: Option<u32>,
    pub is_public: bool,
    pub status: EventStatus,
}

/// Validate a new event. The start date must lie in the future.
pub fn validate_create(input: &EventInput, now: DateTime<Utc>) -> DomainResult<ValidatedEvent> {
    validate_form(input, now, None)
}

/// Validate an edit of an existing event.
///
/// The future-start rule is waived when the submitted start matches the
/// stored one at minute precision, so an event that has already begun can
/// still be edited as long as its start is left alone.
pub fn validate_update(
    input: &EventInput,
    stored_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DomainResult<ValidatedEvent> {
    validate_form(input, now, Some(stored_start))
}

fn validate_form(
    input: &EventInput,
    now: DateTime<Utc>,
    stored_start: Option<DateTime<Utc>>,
) -> DomainResult<ValidatedEvent> {
    let mut errors = ValidationErrors::new();

    let title = match normalize(input.title.as_deref()) {
        None => {
            errors.add("title", "The event title is required.");
            None
        }
        Some(t) if t.chars().count() > 255 => {
            errors.add(
                "title",
                "The event title must not be greater than 255 characters.",
            );
            None
        }
        Some(t) => Some(t),
    };

    let description = normalize(input.description.as_deref());
    if let Some(d) = &description {
        if d.chars().count() > 5000 {
            errors.add(
                "description",
                "The event description must not be greater than 5000 characters.",
            );
        }
    }

    let start_date = match input.start_date {
        None => {
            errors.add("start_date", "The event start date is required.");
            None
        }
        Some(start) => {
            if start_must_be_future(start, stored_start) && start <= now {
                errors.add("start_date", "The event start date must be in the future.");
            }
            Some(start)
        }
    };

    let end_date = match input.end_date {
        None => {
            errors.add("end_date", "The event end date is required.");
            None
        }
        Some(end) => {
            if let Some(start) = start_date {
                if end <= start {
                    errors.add(
                        "end_date",
                        "The event end date must be after the start date.",
                    );
                }
            }
            Some(end)
        }
    };

    let location = normalize(input.location.as_deref());
    if let Some(l) = &location {
        if l.chars().count() > 255 {
            errors.add(
                "location",
                "The event location must not be greater than 255 characters.",
            );
        }
    }

    let max_attendees = match input.max_attendees {
        None => None,
        Some(n) if n < 1 => {
            errors.add("max_attendees", "The maximum attendees must be at least 1.");
            None
        }
        Some(n) if n > 10_000 => {
            errors.add(
                "max_attendees",
                "The maximum attendees must not be greater than 10000.",
            );
            None
        }
        Some(n) => Some(n as u32),
    };

    let status = match normalize(input.status.as_deref()) {
        None => {
            errors.add("status", "The event status is required.");
            None
        }
        Some(raw) => match raw.parse::<EventStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.add(
                    "status",
                    "The event status must be one of: draft, active, cancelled, completed.",
                );
                None
            }
        },
    };

    errors.into_result()?;

    let (Some(title), Some(start_date), Some(end_date), Some(status)) =
        (title, start_date, end_date, status)
    else {
        return Err(DomainError::internal(
            "event validation lost a required field",
        ));
    };

    Ok(ValidatedEvent {
        title,
        description,
        start_date,
        end_date,
        location,
        max_attendees,
        is_public: input.is_public.unwrap_or(false),
        status,
    })
}

fn start_must_be_future(submitted: DateTime<Utc>, stored_start: Option<DateTime<Utc>>) -> bool {
    match stored_start {
        None => true,
        Some(stored) => minute_key(submitted) != minute_key(stored),
    }
}

/// Comparison key at minute precision, matching what edit forms round-trip.
fn minute_key(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn valid_input(now: DateTime<Utc>) -> EventInput {
        EventInput {
            title: Some("Team offsite".to_string()),
            description: Some("Two days in the mountains".to_string()),
            start_date: Some(now + chrono::Duration::days(7)),
            end_date: Some(now + chrono::Duration::days(8)),
            location: Some("Innsbruck".to_string()),
            max_attendees: Some(40),
            is_public: Some(true),
            status: Some("active".to_string()),
        }
    }

    fn messages_for(err: DomainError, field: &str) -> Vec<String> {
        match err {
            DomainError::Validation(errors) => errors
                .iter()
                .filter(|(f, _)| *f == field)
                .flat_map(|(_, m)| m.to_vec())
                .collect(),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_a_complete_form() {
        let now = test_now();
        let validated = validate_create(&valid_input(now), now).unwrap();

        assert_eq!(validated.title, "Team offsite");
        assert_eq!(validated.status, EventStatus::Active);
        assert_eq!(validated.max_attendees, Some(40));
        assert!(validated.is_public);
    }

    #[test]
    fn reports_every_missing_required_field_at_once() {
        let err = validate_create(&EventInput::default(), test_now()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("Expected Validation error");
        };

        assert!(errors.contains("title"));
        assert!(errors.contains("start_date"));
        assert!(errors.contains("end_date"));
        assert!(errors.contains("status"));
        assert!(!errors.contains("description"));
    }

    #[test]
    fn empty_optional_strings_become_absent() {
        let now = test_now();
        let mut input = valid_input(now);
        input.description = Some(String::new());
        input.location = Some("   ".to_string());

        let validated = validate_create(&input, now).unwrap();
        assert_eq!(validated.description, None);
        assert_eq!(validated.location, None);
    }

    #[test]
    fn is_public_defaults_to_false() {
        let now = test_now();
        let mut input = valid_input(now);
        input.is_public = None;

        assert!(!validate_create(&input, now).unwrap().is_public);
    }

    #[test]
    fn rejects_overlong_title() {
        let now = test_now();
        let mut input = valid_input(now);
        input.title = Some("x".repeat(256));

        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "title");
        assert_eq!(
            msgs,
            vec!["The event title must not be greater than 255 characters."]
        );
    }

    #[test]
    fn rejects_overlong_description() {
        let now = test_now();
        let mut input = valid_input(now);
        input.description = Some("x".repeat(5001));

        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "description");
        assert_eq!(
            msgs,
            vec!["The event description must not be greater than 5000 characters."]
        );
    }

    #[test]
    fn create_requires_a_future_start() {
        let now = test_now();
        let mut input = valid_input(now);
        input.start_date = Some(now - chrono::Duration::hours(1));
        input.end_date = Some(now + chrono::Duration::hours(1));

        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "start_date");
        assert_eq!(msgs, vec!["The event start date must be in the future."]);

        // Exactly "now" is not in the future either.
        let mut input = valid_input(now);
        input.start_date = Some(now);
        assert!(validate_create(&input, now).is_err());
    }

    #[test]
    fn end_must_come_strictly_after_start() {
        let now = test_now();
        let mut input = valid_input(now);
        input.end_date = input.start_date;

        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "end_date");
        assert_eq!(msgs, vec!["The event end date must be after the start date."]);
    }

    #[test]
    fn max_attendees_bounds_are_inclusive() {
        let now = test_now();

        let mut input = valid_input(now);
        input.max_attendees = Some(0);
        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "max_attendees");
        assert_eq!(msgs, vec!["The maximum attendees must be at least 1."]);

        let mut input = valid_input(now);
        input.max_attendees = Some(10_001);
        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "max_attendees");
        assert_eq!(
            msgs,
            vec!["The maximum attendees must not be greater than 10000."]
        );

        for ok in [1, 10_000] {
            let mut input = valid_input(now);
            input.max_attendees = Some(ok);
            assert!(validate_create(&input, now).is_ok());
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let now = test_now();
        let mut input = valid_input(now);
        input.status = Some("archived".to_string());

        let msgs = messages_for(validate_create(&input, now).unwrap_err(), "status");
        assert_eq!(
            msgs,
            vec!["The event status must be one of: draft, active, cancelled, completed."]
        );
    }

    #[test]
    fn update_keeps_an_unchanged_past_start() {
        let now = test_now();
        let stored_start = now - chrono::Duration::days(1);

        let mut input = valid_input(now);
        input.start_date = Some(stored_start);
        input.end_date = Some(now + chrono::Duration::days(1));

        let validated = validate_update(&input, stored_start, now).unwrap();
        assert_eq!(validated.start_date, stored_start);
    }

    #[test]
    fn update_matches_stored_start_at_minute_precision() {
        let now = test_now();
        let stored_start = Utc.with_ymd_and_hms(2025, 5, 20, 9, 30, 45).unwrap();
        let same_minute = Utc.with_ymd_and_hms(2025, 5, 20, 9, 30, 0).unwrap();

        let mut input = valid_input(now);
        input.start_date = Some(same_minute);
        input.end_date = Some(now + chrono::Duration::days(1));

        assert!(validate_update(&input, stored_start, now).is_ok());
    }

    #[test]
    fn update_requires_future_start_when_changed() {
        let now = test_now();
        let stored_start = now - chrono::Duration::days(2);

        let mut input = valid_input(now);
        input.start_date = Some(now - chrono::Duration::days(1));
        input.end_date = Some(now + chrono::Duration::days(1));

        let msgs = messages_for(
            validate_update(&input, stored_start, now).unwrap_err(),
            "start_date",
        );
        assert_eq!(msgs, vec!["The event start date must be in the future."]);
    }
}
