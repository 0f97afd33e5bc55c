//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::http::HttpError;
use platform::storage::StorageError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Account exists but the confirmation link was never followed
    #[error("Email address has not been confirmed")]
    EmailNotConfirmed,

    /// Identity provider throttled the request
    #[error("Too many attempts, try again later")]
    RateLimited,

    /// Sign-up for an address that already has an account
    #[error("An account with this email already exists")]
    UserAlreadyRegistered,

    /// Email rejected before or by the identity provider
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password policy violation
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// No profile row for the user
    #[error("Profile not found")]
    ProfileNotFound,

    /// Profile row belongs to another user
    #[error("Profile does not belong to the current user")]
    ProfileMismatch,

    /// Operation requires a signed-in user
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Backend answered with an error that has no dedicated variant
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Backend unreachable
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// Request or profile fetch took too long
    #[error("Request timed out")]
    Timeout,

    /// Local session persistence failed
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::EmailNotConfirmed | AuthError::ProfileMismatch => ErrorKind::Forbidden,
            AuthError::RateLimited => ErrorKind::TooManyRequests,
            AuthError::UserAlreadyRegistered => ErrorKind::Conflict,
            AuthError::InvalidEmail(_) | AuthError::PasswordValidation(_) => {
                ErrorKind::BadRequest
            }
            AuthError::ProfileNotFound => ErrorKind::NotFound,
            AuthError::Backend { status, .. } => ErrorKind::from_status(*status),
            AuthError::Transport(_) => ErrorKind::ServiceUnavailable,
            AuthError::Timeout => ErrorKind::RequestTimeout,
            AuthError::Storage(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Errors the sign-in and sign-up forms render inline
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::EmailNotConfirmed
                | AuthError::RateLimited
                | AuthError::UserAlreadyRegistered
                | AuthError::InvalidEmail(_)
                | AuthError::PasswordValidation(_)
        )
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            AuthError::InvalidCredentials => {
                err.with_action("Check your email and password and try again")
            }
            AuthError::EmailNotConfirmed => {
                err.with_action("Follow the link in the confirmation email first")
            }
            AuthError::RateLimited => err.with_action("Wait a moment before trying again"),
            AuthError::UserAlreadyRegistered => err.with_action("Sign in instead"),
            AuthError::SessionInvalid => err.with_action("Please sign in again"),
            AuthError::Transport(_) | AuthError::Timeout => {
                err.with_action("Check your connection and try again")
            }
            _ => err,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Storage(msg) => {
                tracing::error!(message = %msg, "Session storage error");
            }
            AuthError::Backend { status, message } if *status >= 500 => {
                tracing::error!(status, message = %message, "Backend server error");
            }
            AuthError::Transport(msg) => {
                tracing::warn!(message = %msg, "Backend unreachable");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RateLimited => {
                tracing::warn!("Auth request rate limited");
            }
            AuthError::ProfileMismatch => {
                tracing::warn!("Profile id mismatch detected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }

    fn from_status(status: u16, code: Option<&str>, message: String) -> Self {
        let lowered = message.to_lowercase();

        if lowered.contains("email not confirmed") {
            return AuthError::EmailNotConfirmed;
        }

        match code {
            Some("email_not_confirmed") => AuthError::EmailNotConfirmed,
            Some("invalid_grant" | "invalid_credentials") => AuthError::InvalidCredentials,
            Some("over_request_rate_limit" | "over_email_send_rate_limit") => {
                AuthError::RateLimited
            }
            Some("user_already_exists" | "email_exists" | "user_already_registered") => {
                AuthError::UserAlreadyRegistered
            }
            Some("weak_password") => AuthError::PasswordValidation(message),
            Some("email_address_invalid") => AuthError::InvalidEmail(message),
            Some("PGRST116") => AuthError::ProfileNotFound,
            Some("bad_jwt" | "session_not_found" | "refresh_token_not_found") => {
                AuthError::SessionInvalid
            }
            _ if status == 429 => AuthError::RateLimited,
            _ if lowered.contains("already registered") => AuthError::UserAlreadyRegistered,
            _ => AuthError::Backend { status, message },
        }
    }
}

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return AuthError::Timeout;
        }
        match err {
            HttpError::Status {
                status,
                code,
                message,
            } => AuthError::from_status(status, code.as_deref(), message),
            HttpError::Transport(e) => AuthError::Transport(e.to_string()),
            HttpError::Decode(e) => {
                AuthError::Internal(format!("Unexpected backend response: {}", e))
            }
            HttpError::Build(e) => AuthError::Internal(e.to_string()),
        }
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Storage(err.to_string())
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.to_app_error()
    }
}
