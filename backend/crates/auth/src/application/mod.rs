//! Application Layer
//!
//! Use cases and the auth state machine that sequences them.

pub mod config;
pub mod provider;
pub mod resolve_profile;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod update_password;
pub mod update_profile;

mod worker;

// Re-exports
pub use config::AuthConfig;
pub use provider::AuthProvider;
pub use resolve_profile::ResolveProfileUseCase;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use update_password::UpdatePasswordUseCase;
pub use update_profile::UpdateProfileUseCase;
