//! Input validation utilities
//!
//! Used as `validator` custom functions on request DTOs.

use validator::ValidationError;

use crate::constants::{MAX_USERNAME_LENGTH, MIN_USERNAME_LENGTH};

/// Validate username format
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let rule = |message: &'static str| {
        let mut err = ValidationError::new("username");
        err.message = Some(message.into());
        err
    };

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(rule("Username must be at least 3 characters"));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(rule("Username must be at most 32 characters"));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(rule(
            "Username can only contain letters, numbers, underscores, and hyphens",
        ));
    }
    if !username.chars().next().map(|c| c.is_alphabetic()).unwrap_or(false) {
        return Err(rule("Username must start with a letter"));
    }
    Ok(())
}

/// Validate telephone format: digits with optional `+`, spaces, dashes and parentheses
pub fn validate_telephone(telephone: &str) -> Result<(), ValidationError> {
    let digits = telephone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = telephone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));

    if !allowed || !(4..=20).contains(&digits) {
        let mut err = ValidationError::new("telephone");
        err.message = Some("Invalid telephone number".into());
        return Err(err);
    }
    Ok(())
}

/// Reject strings that are empty once trimmed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
