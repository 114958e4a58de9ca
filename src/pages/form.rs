//! Form input validation for login, registration, and session editing.
//!
//! Each form validates every field and reports all failures at once, so a
//! caller can mark each invalid control rather than stopping at the first.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use crate::net::types::{LoginRequest, RegisterRequest, SessionPayload};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 3;
pub const PASSWORD_MAX_LEN: usize = 40;
pub const DESCRIPTION_MAX_LEN: usize = 2000;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} is not a valid email address")]
    InvalidEmail { field: &'static str },
    #[error("{field} is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str },
}

impl FormError {
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. }
            | Self::InvalidEmail { field }
            | Self::InvalidDate { field } => *field,
        }
    }
}

// =============================================================================
// FIELD VALIDATORS
// =============================================================================

fn required(field: &'static str, value: &str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        return Err(FormError::Required { field });
    }
    Ok(())
}

fn length(field: &'static str, value: &str, min: Option<usize>, max: Option<usize>) -> Result<(), FormError> {
    let len = value.chars().count();
    if let Some(min) = min {
        if len < min {
            return Err(FormError::TooShort { field, min });
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(FormError::TooLong { field, max });
        }
    }
    Ok(())
}

/// Loose structural check: one `@`, non-empty local part and domain, no
/// whitespace, no empty domain labels.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').all(|label| !label.is_empty())
}

fn email(field: &'static str, value: &str) -> Result<(), FormError> {
    required(field, value)?;
    if !is_valid_email(value.trim()) {
        return Err(FormError::InvalidEmail { field });
    }
    Ok(())
}

/// `YYYY-MM-DD` calendar date.
#[must_use]
pub fn is_valid_date(value: &str) -> bool {
    let Ok(format) = time::format_description::parse("[year]-[month]-[day]") else {
        return false;
    };
    time::Date::parse(value, &format).is_ok()
}

/// Calendar-date part of a server timestamp such as
/// `2024-01-01T00:00:00.000+00:00`. Plain dates pass through.
#[must_use]
pub fn date_part(value: &str) -> &str {
    let value = value.trim();
    value.split_once('T').map_or(value, |(date, _)| date)
}

fn date(field: &'static str, value: &str) -> Result<(), FormError> {
    required(field, value)?;
    if !is_valid_date(value.trim()) {
        return Err(FormError::InvalidDate { field });
    }
    Ok(())
}

fn collect(checks: impl IntoIterator<Item = Result<(), FormError>>) -> Vec<FormError> {
    checks.into_iter().filter_map(Result::err).collect()
}

// =============================================================================
// FORMS
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every field error when the form is invalid.
    pub fn validate(&self) -> Result<LoginRequest, Vec<FormError>> {
        let errors = collect([email("email", &self.email), required("password", &self.password)]);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(LoginRequest { email: self.email.trim().to_owned(), password: self.password.clone() })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every field error when the form is invalid.
    pub fn validate(&self) -> Result<RegisterRequest, Vec<FormError>> {
        let name = |field: &'static str, value: &str| -> Result<(), FormError> {
            required(field, value)?;
            length(field, value.trim(), Some(NAME_MIN_LEN), Some(NAME_MAX_LEN))
        };
        let errors = collect([
            email("email", &self.email),
            name("firstName", &self.first_name),
            name("lastName", &self.last_name),
            required("password", &self.password)
                .and_then(|()| length("password", &self.password, Some(PASSWORD_MIN_LEN), Some(PASSWORD_MAX_LEN))),
        ]);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(RegisterRequest {
            email: self.email.trim().to_owned(),
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            password: self.password.clone(),
        })
    }
}

/// Session create/update form. `teacher_id` is `None` until one is picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionForm {
    pub name: String,
    pub date: String,
    pub teacher_id: Option<i64>,
    pub description: String,
}

impl SessionForm {
    /// Validate and build the payload, carrying `users` through unchanged.
    ///
    /// # Errors
    ///
    /// Returns every field error when the form is invalid.
    pub fn validate(&self, users: Vec<i64>) -> Result<SessionPayload, Vec<FormError>> {
        let errors = collect([
            required("name", &self.name),
            date("date", &self.date),
            self.teacher_id
                .map_or(Err(FormError::Required { field: "teacher_id" }), |_| Ok(())),
            required("description", &self.description)
                .and_then(|()| length("description", &self.description, None, Some(DESCRIPTION_MAX_LEN))),
        ]);
        let Some(teacher_id) = self.teacher_id.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };
        Ok(SessionPayload {
            name: self.name.trim().to_owned(),
            date: self.date.trim().to_owned(),
            teacher_id,
            description: self.description.clone(),
            users,
        })
    }
}
