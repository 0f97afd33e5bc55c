//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" vocabulary shared by the client crates:
//! - Unified error type ([`error::app_error::AppError`]) rendered by the view layer
//! - Error classification ([`error::kind::ErrorKind`])
//! - Typed UUID identifiers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
