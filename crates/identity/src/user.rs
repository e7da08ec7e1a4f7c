use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use evently_core::{DomainError, DomainResult, Entity, ExternalId, RoleId, UserId, ValidationErrors};

/// A user account.
///
/// `id` is the arena key; `external_id` is the route key and token subject.
/// Role assignment is single-valued: at most one role per account, held as a
/// plain foreign key. Only the password hash is ever stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub role_id: Option<RoleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

/// Raw user form payload, exactly as submitted.
///
/// `role` distinguishes three shapes: key absent (keep the current role on
/// update), explicit null or empty string (clear it), and a role name
/// (assign it).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    #[serde(deserialize_with = "crate::serde_util::double_option")]
    pub role: Option<Option<String>>,
}

/// Requested role assignment on an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Keep,
    Clear,
    Assign(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUserUpdate {
    pub name: String,
    pub email: String,
    /// `None` when the password fields were left blank.
    pub password: Option<String>,
    pub role: RoleChange,
}

/// Validate a new account. The password is mandatory here.
pub fn validate_user_create(input: &UserInput) -> DomainResult<ValidatedUserCreate> {
    let mut errors = ValidationErrors::new();

    let name = check_name(input, &mut errors);
    let email = check_email(input, &mut errors);
    let password = match password_submission(input) {
        None => {
            errors.add("password", "The user password is required.");
            None
        }
        Some(password) => check_password(password, &input.password_confirmation, &mut errors),
    };
    let role = match role_change(input) {
        RoleChange::Assign(name) => Some(name),
        _ => None,
    };

    errors.into_result()?;

    let (Some(name), Some(email), Some(password)) = (name, email, password) else {
        return Err(DomainError::internal(
            "user validation lost a required field",
        ));
    };

    Ok(ValidatedUserCreate {
        name,
        email,
        password,
        role,
    })
}

/// Validate an account edit. Blank password fields mean "leave unchanged".
pub fn validate_user_update(input: &UserInput) -> DomainResult<ValidatedUserUpdate> {
    let mut errors = ValidationErrors::new();

    let name = check_name(input, &mut errors);
    let email = check_email(input, &mut errors);
    let password = match password_submission(input) {
        None => None,
        Some(password) => check_password(password, &input.password_confirmation, &mut errors),
    };
    let role = role_change(input);

    errors.into_result()?;

    let (Some(name), Some(email)) = (name, email) else {
        return Err(DomainError::internal(
            "user validation lost a required field",
        ));
    };

    Ok(ValidatedUserUpdate {
        name,
        email,
        password,
        role,
    })
}

fn check_name(input: &UserInput, errors: &mut ValidationErrors) -> Option<String> {
    match normalize(input.name.as_deref()) {
        None => {
            errors.add("name", "The user name is required.");
            None
        }
        Some(name) if name.chars().count() > 255 => {
            errors.add(
                "name",
                "The user name must not be greater than 255 characters.",
            );
            None
        }
        Some(name) => Some(name),
    }
}

fn check_email(input: &UserInput, errors: &mut ValidationErrors) -> Option<String> {
    match normalize(input.email.as_deref()) {
        None => {
            errors.add("email", "The user email is required.");
            None
        }
        Some(email) if email.chars().count() > 255 => {
            errors.add(
                "email",
                "The user email must not be greater than 255 characters.",
            );
            None
        }
        Some(email) if !is_plausible_email(&email) => {
            errors.add("email", "The user email must be a valid email address.");
            None
        }
        Some(email) => Some(email),
    }
}

/// Blank or missing password fields count as no submission at all.
fn password_submission(input: &UserInput) -> Option<&str> {
    input.password.as_deref().filter(|p| !p.is_empty())
}

fn check_password(
    password: &str,
    confirmation: &Option<String>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let mut ok = true;
    if password.chars().count() < 8 {
        errors.add(
            "password",
            "The user password must be at least 8 characters.",
        );
        ok = false;
    }
    if confirmation.as_deref() != Some(password) {
        errors.add(
            "password",
            "The user password confirmation must match.",
        );
        ok = false;
    }
    ok.then(|| password.to_string())
}

fn role_change(input: &UserInput) -> RoleChange {
    match &input.role {
        None => RoleChange::Keep,
        Some(role) => match normalize(role.as_deref()) {
            None => RoleChange::Clear,
            Some(name) => RoleChange::Assign(name),
        },
    }
}

/// Structural sanity check, not an RFC validator: one `@`, both sides
/// non-empty, no whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
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

    fn base_input() -> UserInput {
        UserInput {
            name: Some("Dana Reyes".to_string()),
            email: Some("dana@example.com".to_string()),
            password: Some("hunter2hunter2".to_string()),
            password_confirmation: Some("hunter2hunter2".to_string()),
            role: None,
        }
    }

    fn field_messages(err: DomainError, field: &str) -> Vec<String> {
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
    fn create_accepts_a_complete_form() {
        let validated = validate_user_create(&base_input()).unwrap();
        assert_eq!(validated.name, "Dana Reyes");
        assert_eq!(validated.email, "dana@example.com");
        assert_eq!(validated.role, None);
    }

    #[test]
    fn create_requires_name_email_and_password() {
        let err = validate_user_create(&UserInput::default()).unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("Expected Validation error");
        };
        assert!(errors.contains("name"));
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
    }

    #[test]
    fn rejects_implausible_emails() {
        for bad in ["plainaddress", "two@@ats", "spaced @example.com", "@nodomain", "nolocal@"] {
            let mut input = base_input();
            input.email = Some(bad.to_string());
            let msgs = field_messages(validate_user_create(&input).unwrap_err(), "email");
            assert_eq!(
                msgs,
                vec!["The user email must be a valid email address."],
                "email {bad:?}"
            );
        }
    }

    #[test]
    fn password_must_be_long_enough_and_confirmed() {
        let mut input = base_input();
        input.password = Some("short".to_string());
        input.password_confirmation = Some("short".to_string());
        let msgs = field_messages(validate_user_create(&input).unwrap_err(), "password");
        assert_eq!(msgs, vec!["The user password must be at least 8 characters."]);

        let mut input = base_input();
        input.password_confirmation = Some("different-thing".to_string());
        let msgs = field_messages(validate_user_create(&input).unwrap_err(), "password");
        assert_eq!(msgs, vec!["The user password confirmation must match."]);
    }

    #[test]
    fn create_treats_blank_role_as_no_role() {
        let mut input = base_input();
        input.role = Some(Some(String::new()));
        assert_eq!(validate_user_create(&input).unwrap().role, None);

        let mut input = base_input();
        input.role = Some(Some("editor".to_string()));
        assert_eq!(
            validate_user_create(&input).unwrap().role,
            Some("editor".to_string())
        );
    }

    #[test]
    fn update_without_password_keeps_the_current_one() {
        let mut input = base_input();
        input.password = None;
        input.password_confirmation = None;

        let validated = validate_user_update(&input).unwrap();
        assert_eq!(validated.password, None);
    }

    #[test]
    fn update_with_blank_password_keeps_the_current_one() {
        let mut input = base_input();
        input.password = Some(String::new());
        input.password_confirmation = Some(String::new());

        let validated = validate_user_update(&input).unwrap();
        assert_eq!(validated.password, None);
    }

    #[test]
    fn update_with_short_password_still_fails() {
        let mut input = base_input();
        input.password = Some("short".to_string());
        input.password_confirmation = Some("short".to_string());

        let msgs = field_messages(validate_user_update(&input).unwrap_err(), "password");
        assert_eq!(msgs, vec!["The user password must be at least 8 characters."]);
    }

    #[test]
    fn update_role_semantics_distinguish_absent_null_and_value() {
        let mut input = base_input();
        input.role = None;
        assert_eq!(validate_user_update(&input).unwrap().role, RoleChange::Keep);

        input.role = Some(None);
        assert_eq!(validate_user_update(&input).unwrap().role, RoleChange::Clear);

        input.role = Some(Some(String::new()));
        assert_eq!(validate_user_update(&input).unwrap().role, RoleChange::Clear);

        input.role = Some(Some("admin".to_string()));
        assert_eq!(
            validate_user_update(&input).unwrap().role,
            RoleChange::Assign("admin".to_string())
        );
    }

    #[test]
    fn role_survives_json_round_trip_shapes() {
        let absent: UserInput = serde_json::from_str(r#"{}"#).unwrap();
        assert!(absent.role.is_none());

        let null_role: UserInput = serde_json::from_str(r#"{"role": null}"#).unwrap();
        assert_eq!(null_role.role, Some(None));

        let named: UserInput = serde_json::from_str(r#"{"role": "user"}"#).unwrap();
        assert_eq!(named.role, Some(Some("user".to_string())));
    }
}
