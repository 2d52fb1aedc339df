//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on:
//! - Reasonable UX limits for names, notes, purposes
//! - Embedded document store has no built-in length enforcement

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Person names: members, guests, admins
pub const MAX_NAME_LEN: usize = 200;

/// Visit purpose free text
pub const MAX_PURPOSE_LEN: usize = 500;

/// Short identifiers: USN, phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length (admin account)
pub const MIN_PASSWORD_LEN: usize = 6;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::Validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate an email address: non-empty, length-bounded, single `@` with
/// non-empty local and domain parts. Full RFC parsing is left to the mail
/// system; this only rejects obvious garbage before it reaches the database.
pub fn validate_email(value: &str) -> Result<(), AppError> {
    validate_required_text(value, "email", MAX_EMAIL_LEN)?;
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Validation(format!("Invalid email: {value}"))),
    }
}

/// Validate a new admin password (minimum length, maximum length).
pub fn validate_new_password(value: &str) -> Result<(), AppError> {
    if value.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if value.len() > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password is too long (max {MAX_PASSWORD_LEN} chars)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("4SO22CS100", "usn", MAX_SHORT_TEXT_LEN).is_ok());
        assert!(validate_required_text("   ", "usn", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(101), "usn", MAX_SHORT_TEXT_LEN).is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("admin@sosc.club").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@signs.com").is_err());
        assert!(validate_email("@missing.local").is_err());
    }

    #[test]
    fn test_new_password() {
        assert!(validate_new_password("secret").is_ok());
        assert!(validate_new_password("short").is_err());
        assert!(validate_new_password(&"x".repeat(129)).is_err());
    }
}
