use evently_auth::Actor;
use evently_identity::User;

/// Authenticated caller context for a request.
///
/// The auth middleware resolves this from the store on every request, so a
/// role or grant edit applies to the caller's very next request without a
/// token re-issue.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    user: User,
    actor: Actor,
}

impl CurrentUser {
    pub fn new(user: User, actor: Actor) -> Self {
        Self { user, actor }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}
