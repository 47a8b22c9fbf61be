//! Request body rules checked before any call reaches the identity service.

use email_address::EmailAddress;

use super::handlers::ApiError;

pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const STRONG_PASSWORD_MIN_LENGTH: usize = 8;

pub fn email(value: &str) -> Result<(), ApiError> {
    if EmailAddress::is_valid(value) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "email must be a valid email address".to_string(),
        ))
    }
}

pub fn not_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::BadRequest(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

pub fn min_length(field: &str, value: &str, min: usize) -> Result<(), ApiError> {
    if value.chars().count() < min {
        Err(ApiError::BadRequest(format!(
            "{} must be at least {} characters",
            field, min
        )))
    } else {
        Ok(())
    }
}

/// At least eight characters with an uppercase letter, a lowercase letter, a digit and a
/// character that is none of those.
pub fn strong_password(value: &str) -> Result<(), ApiError> {
    let long_enough = value.chars().count() >= STRONG_PASSWORD_MIN_LENGTH;
    let has_upper = value.chars().any(char::is_uppercase);
    let has_lower = value.chars().any(char::is_lowercase);
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| !c.is_alphanumeric());

    if long_enough && has_upper && has_lower && has_digit && has_special {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Password is not strong enough".to_string(),
        ))
    }
}
