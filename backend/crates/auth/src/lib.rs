//! Auth (Authentication) Client Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, collaborator traits
//! - `application/` - Use cases and the auth state machine
//! - `infra/` - Hosted backend and in-memory implementations
//! - `presentation/` - Route guard, route table, navigation, view DTOs
//!
//! ## Features
//! - Session restore at startup, sign-in/sign-up/logout
//! - Profile-derived admin flag (`role == "admin"`, nothing else)
//! - Serialized handling of session change notifications
//! - Edge-triggered route guarding with an optional admin redirect
//!
//! ## Failure Model
//! - Profile fetch failures degrade to "no profile, not admin"
//! - Remote sign-out is best-effort; local sign-out always happens
//! - Credential failures are returned as [`AuthError`] values

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::provider::AuthProvider;
pub use error::{AuthError, AuthResult};
pub use infra::{HostedBackend, InMemoryBackend};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::repository::SignUpResult;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod guard {
    pub use crate::presentation::guard::*;
    pub use crate::presentation::navigation::*;
    pub use crate::presentation::routes::*;
}
