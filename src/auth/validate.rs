//! Field checks for registration and profile changes.

use super::MIN_PASSWORD_LENGTH;

/// True when every field has non-whitespace content.
pub fn all_present<S: AsRef<str>>(fields: &[S]) -> bool {
    fields.iter().all(|f| !f.as_ref().trim().is_empty())
}

/// Check a replacement password.
pub fn validate_new_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("New password must be at least 6 characters long");
    }

    Ok(())
}
