//! Field-level checks shared by every intake form.
//!
//! Each check returns the first problem it finds; handlers and the HTTP
//! client run the same checks so a bad form never needs a round trip.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Indian mobile numbers, optionally prefixed with +91.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+91[\-\s]?)?[6-9]\d{9}$").unwrap());

static IFSC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap());

static PINCODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").unwrap());

static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{9,18}$").unwrap());

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid phone number")]
    InvalidPhone,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Account numbers do not match")]
    AccountNumberMismatch,

    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T = ()> = std::result::Result<T, ValidationError>;

pub fn required(field: &'static str, value: &str) -> Result {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn email(value: &str) -> Result {
    required("email", value)?;
    if !EMAIL_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn phone(value: &str) -> Result {
    required("phone", value)?;
    if !PHONE_RE.is_match(value.trim()) {
        return Err(ValidationError::InvalidPhone);
    }
    Ok(())
}

/// Checks an email that may be left blank.
pub fn optional_email(value: Option<&str>) -> Result {
    match value {
        Some(v) if !v.trim().is_empty() => email(v),
        _ => Ok(()),
    }
}

pub fn optional_phone(value: Option<&str>) -> Result {
    match value {
        Some(v) if !v.trim().is_empty() => phone(v),
        _ => Ok(()),
    }
}

pub fn pincode(value: &str) -> Result {
    if value.trim().is_empty() {
        return Ok(());
    }
    if !PINCODE_RE.is_match(value.trim()) {
        return Err(ValidationError::invalid("pincode", "must be a 6 digit code"));
    }
    Ok(())
}

pub fn positive(field: &'static str, value: f64) -> Result {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::invalid(field, "must be greater than zero"));
    }
    Ok(())
}

pub fn non_negative(field: &'static str, value: f64) -> Result {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid(field, "must not be negative"));
    }
    Ok(())
}

pub fn password(password: &str, confirm: &str) -> Result {
    required("password", password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn account_number(account: &str, confirm: &str) -> Result {
    required("account_number", account)?;
    if !ACCOUNT_RE.is_match(account.trim()) {
        return Err(ValidationError::invalid(
            "account_number",
            "must contain 9 to 18 digits",
        ));
    }
    if account.trim() != confirm.trim() {
        return Err(ValidationError::AccountNumberMismatch);
    }
    Ok(())
}

pub fn ifsc(value: &str) -> Result {
    required("ifsc_code", value)?;
    if !IFSC_RE.is_match(&value.trim().to_uppercase()) {
        return Err(ValidationError::invalid("ifsc_code", "is not a valid IFSC code"));
    }
    Ok(())
}
