//! Entity Module

pub mod auth_state;
pub mod profile;
pub mod session;
pub mod session_change;
pub mod user;

pub use auth_state::{AuthPhase, AuthState};
pub use profile::{Profile, ProfileUpdate};
pub use session::Session;
pub use session_change::{AuthChangeEvent, SessionChange};
pub use user::User;
