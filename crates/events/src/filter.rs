//! Listing filters for event queries.
//!
//! Filters narrow the set a caller is already scoped to; they never widen
//! it. All of them combine with AND.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::event::{Event, EventStatus};

/// Time-bucket filter relative to the query clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    /// Starts after now.
    Upcoming,
    /// Started, not yet ended.
    Ongoing,
    /// Ended before now.
    Past,
}

impl DateFilter {
    pub fn matches(&self, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            DateFilter::Upcoming => start > now,
            DateFilter::Ongoing => start <= now && end >= now,
            DateFilter::Past => end < now,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// Caller-supplied narrowing of an event listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub search: Option<String>,
    pub status: Option<EventStatus>,
    pub visibility: Option<Visibility>,
    pub date_filter: Option<DateFilter>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event, now: DateTime<Utc>) -> bool {
        if let Some(needle) = &self.search {
            if !search_matches(event, needle) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        if let Some(visibility) = self.visibility {
            let wants_public = visibility == Visibility::Public;
            if event.is_public != wants_public {
                return false;
            }
        }
        if let Some(date_filter) = self.date_filter {
            if !date_filter.matches(event.start_date, event.end_date, now) {
                return false;
            }
        }
        true
    }
}

/// Case-insensitive substring match over title, description and location.
fn search_matches(event: &Event, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    event.title.to_lowercase().contains(&needle)
        || event
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || event
            .location
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(&needle))
}
