//! Input validation utilities for auth service

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

// Compiled once at first use; the pattern is a constant in practice
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("hardcoded username regex is invalid - fix source code")
});

/// Validate username shape (alphanumeric with `_`, `.`, `-`; length is
/// enforced separately by the request's length bounds)
pub fn validate_username(username: &str) -> bool {
    !username.is_empty() && username.len() <= 255 && USERNAME_REGEX.is_match(username)
}

/// validator crate compatible custom validator for username shape
pub fn validate_username_shape_validator(username: &str) -> Result<(), ValidationError> {
    if validate_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}
