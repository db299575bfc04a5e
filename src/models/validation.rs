//! Field validation shared by the client and the reference backend.

use once_cell::sync::Lazy;
use regex::Regex;

use super::EmployeeDraft;

/// `local@domain.tld`: printable ASCII, exactly one `@`, a dot after it.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[[:graph:]&&[^@]]+@[[:graph:]&&[^@]]+\.[[:graph:]&&[^@]]+$")
        .expect("email pattern is valid")
});

pub const INVALID_EMAIL: &str = "Please enter a valid email";
pub const FIRST_NAME_REQUIRED: &str = "First name is required";

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Check the email field; an empty email is allowed.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() || is_valid_email(email) {
        Ok(())
    } else {
        Err(INVALID_EMAIL)
    }
}

/// Full check applied before a record is stored.
pub fn validate_draft(draft: &EmployeeDraft) -> Result<(), &'static str> {
    if draft.first_name.trim().is_empty() {
        return Err(FIRST_NAME_REQUIRED);
    }
    validate_email(&draft.email_id)
}
