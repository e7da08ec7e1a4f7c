use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;

use evently_auth::{Actor, EventScope, RoleName, TokenCodec, TokenError};
use evently_core::{DomainResult, Page, PageRequest, UserId};
use evently_events::{Event, EventFilter, EventStatus};
use evently_identity::{
    Permission, Role, User, UserInput, ValidatedUserCreate, validate_user_create, verify_password,
};
use evently_store::AppStore;

use crate::app::dto::{
    self, DashboardQuery, EventListQuery, NameSearchQuery, UserListQuery,
};
use crate::recaptcha::CaptchaVerifier;

/// Session length for issued tokens.
const TOKEN_TTL_HOURS: i64 = 24;

/// The public landing page shows a denser grid than the admin tables.
const PUBLIC_PER_PAGE: u32 = 12;

/// Shared state behind every route: the store, the token codec and the
/// captcha seam.
pub struct AppServices {
    store: Arc<AppStore>,
    tokens: Arc<TokenCodec>,
    captcha: Arc<dyn CaptchaVerifier>,
}

impl AppServices {
    pub fn new(
        store: Arc<AppStore>,
        tokens: Arc<TokenCodec>,
        captcha: Arc<dyn CaptchaVerifier>,
    ) -> Self {
        Self {
            store,
            tokens,
            captcha,
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn captcha(&self) -> &dyn CaptchaVerifier {
        self.captcha.as_ref()
    }

    pub fn issue_token(&self, user: &User, now: DateTime<Utc>) -> Result<String, TokenError> {
        self.tokens
            .issue(user.external_id, now, Duration::hours(TOKEN_TTL_HOURS))
    }

    /// Password check against the stored hash. `None` for unknown email or
    /// wrong password; the route reports both identically.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<User> {
        let user = self.store.user_by_email(email)?;
        verify_password(password, &user.password_hash).then_some(user)
    }

    /// Self-registration: always the `user` role, regardless of any submitted
    /// `role` field, and the account starts out verified.
    pub fn register(&self, input: &UserInput, now: DateTime<Utc>) -> DomainResult<User> {
        let form = validate_user_create(input)?;
        let form = ValidatedUserCreate {
            role: Some(RoleName::USER.as_str().to_string()),
            ..form
        };
        self.store.create_user(&form, Some(now), now)
    }

    pub fn role_name_of(&self, user: &User) -> Option<String> {
        let role_id = user.role_id?;
        self.store.role(role_id).map(|r| r.name)
    }

    // -------------------------
    // Event listings
    // -------------------------

    pub fn list_events(
        &self,
        actor: &Actor,
        query: &EventListQuery,
        now: DateTime<Utc>,
    ) -> Page<(Event, Option<String>)> {
        let page_request =
            PageRequest::from_query(query.page, query.per_page, PageRequest::DEFAULT_PER_PAGE);

        // An unknown status value matches no rows at all, unlike the other
        // filters which fall back to "no constraint".
        let status = match query.status.as_deref() {
            Some(raw) => match raw.parse::<EventStatus>() {
                Ok(status) => Some(status),
                Err(_) => return Page::paginate(Vec::new(), page_request),
            },
            None => None,
        };
        let filter = EventFilter {
            search: query.search.clone(),
            status,
            visibility: query.visibility.as_deref().and_then(dto::parse_visibility),
            date_filter: query
                .date_filter
                .as_deref()
                .and_then(dto::parse_date_filter),
        };

        let scope = EventScope::for_actor(actor);
        let mut events: Vec<Event> = self
            .store
            .events()
            .into_iter()
            .filter(|e| scope.permits(e.user_id, e.is_public))
            .filter(|e| filter.matches(e, now))
            .collect();
        events.sort_by(|a, b| b.start_date.cmp(&a.start_date));

        let names = self.user_names();
        Page::paginate(events, page_request).map(|event| {
            let owner = names.get(&event.user_id).cloned();
            (event, owner)
        })
    }

    /// Landing-page listing: public active events only, soonest first.
    pub fn public_events(
        &self,
        query: &NameSearchQuery,
        now: DateTime<Utc>,
    ) -> Page<(Event, Option<String>)> {
        let page_request = PageRequest::from_query(query.page, query.per_page, PUBLIC_PER_PAGE);
        let filter = EventFilter {
            search: query.search.clone(),
            ..EventFilter::default()
        };

        let mut events: Vec<Event> = self
            .store
            .events()
            .into_iter()
            .filter(Event::is_publicly_listed)
            .filter(|e| filter.matches(e, now))
            .collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date));

        let names = self.user_names();
        Page::paginate(events, page_request).map(|event| {
            let owner = names.get(&event.user_id).cloned();
            (event, owner)
        })
    }

    pub fn calendar(&self, actor: &Actor) -> Vec<CalendarEntry> {
        let scope = EventScope::for_actor(actor);
        let names = self.user_names();

        let mut events: Vec<Event> = self
            .store
            .events()
            .into_iter()
            .filter(|e| scope.permits(e.user_id, e.is_public))
            .collect();
        events.sort_by(|a, b| a.start_date.cmp(&b.start_date));

        events
            .into_iter()
            .map(|event| CalendarEntry {
                owner_name: names.get(&event.user_id).cloned(),
                is_owner: event.user_id == actor.user_id,
                event,
            })
            .collect()
    }

    // -------------------------
    // Admin listings
    // -------------------------

    pub fn list_users(&self, query: &UserListQuery) -> Page<(User, Option<String>)> {
        let page_request =
            PageRequest::from_query(query.page, query.per_page, PageRequest::DEFAULT_PER_PAGE);
        let role_names: HashMap<_, _> = self
            .store
            .roles()
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();

        let mut users: Vec<User> = self
            .store
            .users()
            .into_iter()
            .filter(|u| user_search_matches(u, query.search.as_deref()))
            .filter(|u| match query.verified.as_deref() {
                Some("verified") => u.email_verified_at.is_some(),
                Some("unverified") => u.email_verified_at.is_none(),
                _ => true,
            })
            .filter(|u| match query.role.as_deref() {
                Some(role) => u
                    .role_id
                    .and_then(|id| role_names.get(&id))
                    .is_some_and(|name| name == role),
                None => true,
            })
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));

        Page::paginate(users, page_request).map(|user| {
            let role = user.role_id.and_then(|id| role_names.get(&id).cloned());
            (user, role)
        })
    }

    pub fn list_roles(&self, query: &NameSearchQuery) -> Page<(Role, Vec<(u64, String)>)> {
        let page_request =
            PageRequest::from_query(query.page, query.per_page, PageRequest::DEFAULT_PER_PAGE);

        let mut roles: Vec<Role> = self
            .store
            .roles()
            .into_iter()
            .filter(|r| name_matches(&r.name, query.search.as_deref()))
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));

        Page::paginate(roles, page_request).map(|role| {
            let permissions = self.role_permission_pairs(&role);
            (role, permissions)
        })
    }

    pub fn list_permissions(&self, query: &NameSearchQuery) -> Page<Permission> {
        let page_request =
            PageRequest::from_query(query.page, query.per_page, PageRequest::DEFAULT_PER_PAGE);

        let mut permissions: Vec<Permission> = self
            .store
            .permissions()
            .into_iter()
            .filter(|p| name_matches(&p.name, query.search.as_deref()))
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));

        Page::paginate(permissions, page_request)
    }

    /// Full permission catalog, name order. Role forms submit names from it.
    pub fn permission_catalog(&self) -> Vec<Permission> {
        let mut permissions = self.store.permissions();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    /// Full role catalog, name order. User forms assign roles from it.
    pub fn role_catalog(&self) -> Vec<(Role, Vec<(u64, String)>)> {
        let mut roles = self.store.roles();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
            .into_iter()
            .map(|role| {
                let permissions = self.role_permission_pairs(&role);
                (role, permissions)
            })
            .collect()
    }

    pub fn role_permission_pairs(&self, role: &Role) -> Vec<(u64, String)> {
        let mut pairs: Vec<(u64, String)> = role
            .permissions
            .iter()
            .filter_map(|id| self.store.permission(*id))
            .map(|p| (p.id.as_u64(), p.name))
            .collect();
        pairs.sort_by(|a, b| a.1.cmp(&b.1));
        pairs
    }

    // -------------------------
    // Dashboard
    // -------------------------

    pub fn dashboard(&self, query: &DashboardQuery, now: DateTime<Utc>) -> DashboardData {
        let events = self.store.events();
        let total_events = events.len() as u64;
        let total_users = self.store.users().len() as u64;
        let upcoming_events = events.iter().filter(|e| e.start_date > now).count() as u64;

        // Status filter narrows the chart only; the stat cards stay global.
        let chart_events: Vec<&Event> = match query.status_filter.as_deref() {
            None => events.iter().collect(),
            Some(raw) => match raw.parse::<EventStatus>() {
                Ok(status) => events.iter().filter(|e| e.status == status).collect(),
                Err(_) => Vec::new(),
            },
        };
        let period = ChartPeriod::parse(query.period.as_deref());
        let chart = chart_buckets(&chart_events, period, now);

        DashboardData {
            total_events,
            total_users,
            upcoming_events,
            period,
            chart,
        }
    }

    fn user_names(&self) -> HashMap<UserId, String> {
        self.store
            .users()
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect()
    }
}

/// One scoped event prepared for the calendar payload.
pub struct CalendarEntry {
    pub event: Event,
    pub owner_name: Option<String>,
    pub is_owner: bool,
}

pub struct DashboardData {
    pub total_events: u64,
    pub total_users: u64,
    pub upcoming_events: u64,
    pub period: ChartPeriod,
    pub chart: Vec<ChartBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBucket {
    pub date: String,
    pub count: u64,
    pub formatted_date: String,
}

/// Chart window selector. Week and month bucket by day, year by month.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChartPeriod {
    Week,
    Month,
    Year,
}

impl ChartPeriod {
    /// Anything unrecognized is the default month window.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("week") => ChartPeriod::Week,
            Some("year") => ChartPeriod::Year,
            _ => ChartPeriod::Month,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPeriod::Week => "week",
            ChartPeriod::Month => "month",
            ChartPeriod::Year => "year",
        }
    }
}

/// Zero-filled creation-date histogram ending at `now`.
///
/// Bucket keys are `%Y-%m-%d` (daily) or `%Y-%m` (monthly); an event outside
/// the window formats to a key no bucket carries, so no range check is needed.
fn chart_buckets(events: &[&Event], period: ChartPeriod, now: DateTime<Utc>) -> Vec<ChartBucket> {
    let buckets: Vec<(String, String)> = match period {
        ChartPeriod::Week => daily_buckets(now, 7),
        ChartPeriod::Month => daily_buckets(now, 30),
        ChartPeriod::Year => monthly_buckets(now, 12),
    };
    let key_format = match period {
        ChartPeriod::Year => "%Y-%m",
        _ => "%Y-%m-%d",
    };

    let mut counts: HashMap<String, u64> = HashMap::new();
    for event in events {
        *counts
            .entry(event.created_at.format(key_format).to_string())
            .or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|(date, formatted_date)| ChartBucket {
            count: counts.get(&date).copied().unwrap_or(0),
            date,
            formatted_date,
        })
        .collect()
}

fn daily_buckets(now: DateTime<Utc>, days: i64) -> Vec<(String, String)> {
    (0..days)
        .rev()
        .map(|offset| {
            let day = now - Duration::days(offset);
            (
                day.format("%Y-%m-%d").to_string(),
                day.format("%b %-d").to_string(),
            )
        })
        .collect()
}

fn monthly_buckets(now: DateTime<Utc>, months: u32) -> Vec<(String, String)> {
    (0..months)
        .rev()
        .map(|offset| {
            let month = now - Months::new(offset);
            (
                month.format("%Y-%m").to_string(),
                month.format("%b %Y").to_string(),
            )
        })
        .collect()
}

fn user_search_matches(user: &User, search: Option<&str>) -> bool {
    match search {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            needle.is_empty()
                || user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
        }
    }
}

fn name_matches(name: &str, search: Option<&str>) -> bool {
    match search {
        None => true,
        Some(needle) => name.to_lowercase().contains(&needle.to_lowercase()),
    }
}
