//! Domain Layer
//!
//! Contains entities, value objects, the subscription primitive and
//! collaborator traits.

pub mod entity;
pub mod repository;
pub mod subscription;
pub mod value_object;

// Re-exports
pub use entity::{
    AuthChangeEvent, AuthPhase, AuthState, Profile, ProfileUpdate, Session, SessionChange, User,
};
pub use repository::{ProfileRepository, SessionStore, SignUpResult};
pub use subscription::{SessionBroadcaster, SessionSubscription};
