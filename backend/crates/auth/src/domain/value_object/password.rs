//! Password Value Object
//!
//! Passwords never leave this type except to be placed in a request body.
//! Hashing and breach checks are the identity provider's job.

use kernel::error::app_error::{AppError, AppResult};
use std::fmt;

/// Minimum length accepted for new passwords
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Longest password the identity provider hashes without truncation
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Raw password from user input
pub struct RawPassword(String);

impl RawPassword {
    /// Password chosen for a new account or a password change
    ///
    /// ## Validation Rules
    /// - At least [`MIN_PASSWORD_LENGTH`] characters
    /// - At most [`MAX_PASSWORD_LENGTH`] bytes
    /// - Not only whitespace
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();

        if raw.trim().is_empty() {
            return Err(AppError::bad_request("Password cannot be empty")
                .with_action("Please enter a password"));
        }

        let chars = raw.chars().count();
        if chars < MIN_PASSWORD_LENGTH {
            return Err(AppError::bad_request(format!(
                "Password must be at least {} characters (got {})",
                MIN_PASSWORD_LENGTH, chars
            ))
            .with_action("Please choose a longer password"));
        }

        if raw.len() > MAX_PASSWORD_LENGTH {
            return Err(AppError::bad_request(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_LENGTH
            ))
            .with_action("Please choose a shorter password"));
        }

        Ok(Self(raw))
    }

    /// Password typed at sign-in
    ///
    /// Only emptiness is checked: accounts created under an older policy must
    /// still be able to log in.
    pub fn for_sign_in(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AppError::bad_request("Password cannot be empty")
                .with_action("Please enter your password"));
        }
        Ok(Self(raw))
    }

    /// Plain text for a request body
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}
