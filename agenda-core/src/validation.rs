//! Client-side validation.
//!
//! Failures here block submission; nothing is sent to the server. Validators
//! collect every issue so a form can show them all at once.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::contact::ContactDraft;
use crate::friend::FriendRequestDraft;

/// Maximum number of digits accepted in a phone number.
pub const PHONE_MAX_DIGITS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Start date is required")]
    MissingStart,

    #[error("End date must not be before the start date")]
    EndBeforeStart,

    #[error("Name is required")]
    MissingName,

    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Phone number may only contain digits")]
    PhoneNotNumeric,

    #[error("Phone number must have at most {} digits", PHONE_MAX_DIGITS)]
    PhoneTooLong,

    #[error("Password is required")]
    MissingPassword,
}

/// A non-empty set of validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// `Ok` when no issues were found.
    pub fn check(issues: Vec<ValidationError>) -> Result<(), ValidationErrors> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(issues))
        }
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Title, start and end rules shared by events and itineraries.
pub fn validate_schedule(
    title: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    if title.trim().is_empty() {
        issues.push(ValidationError::MissingTitle);
    }
    match (start, end) {
        (None, _) => issues.push(ValidationError::MissingStart),
        (Some(start), Some(end)) if end < start => issues.push(ValidationError::EndBeforeStart),
        _ => {}
    }

    ValidationErrors::check(issues)
}

pub fn validate_contact(contact: &ContactDraft) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    if contact.name.trim().is_empty() {
        issues.push(ValidationError::MissingName);
    }
    check_email(&contact.email, &mut issues);
    if let Some(phone) = &contact.phone {
        check_phone(phone, &mut issues);
    }

    ValidationErrors::check(issues)
}

pub fn validate_friend_request(request: &FriendRequestDraft) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();
    check_email(&request.recipient_email, &mut issues);
    ValidationErrors::check(issues)
}

pub fn validate_phone(phone: &str) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();
    check_phone(phone, &mut issues);
    ValidationErrors::check(issues)
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    if name.trim().is_empty() {
        issues.push(ValidationError::MissingName);
    }
    check_email(email, &mut issues);
    if password.is_empty() {
        issues.push(ValidationError::MissingPassword);
    }

    ValidationErrors::check(issues)
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    if email.trim().is_empty() {
        issues.push(ValidationError::MissingEmail);
    }
    if password.is_empty() {
        issues.push(ValidationError::MissingPassword);
    }

    ValidationErrors::check(issues)
}

/// Structural email check: one `@`, a non-empty local part and a dotted
/// domain with non-empty labels, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

fn check_email(email: &str, issues: &mut Vec<ValidationError>) {
    let email = email.trim();
    if email.is_empty() {
        issues.push(ValidationError::MissingEmail);
    } else if !is_valid_email(email) {
        issues.push(ValidationError::InvalidEmail(email.to_string()));
    }
}

fn check_phone(phone: &str, issues: &mut Vec<ValidationError>) {
    let phone = phone.trim();
    if phone.is_empty() {
        return;
    }
    if !phone.chars().all(|c| c.is_ascii_digit()) {
        issues.push(ValidationError::PhoneNotNumeric);
    } else if phone.len() > PHONE_MAX_DIGITS {
        issues.push(ValidationError::PhoneTooLong);
    }
}
