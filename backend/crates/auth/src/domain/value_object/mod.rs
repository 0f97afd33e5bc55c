//! Value Object Module

pub mod email;
pub mod password;
pub mod sign_up_metadata;
pub mod user_id;
pub mod user_role;

pub use email::Email;
pub use password::RawPassword;
pub use sign_up_metadata::SignUpMetadata;
pub use user_id::UserId;
pub use user_role::UserRole;
