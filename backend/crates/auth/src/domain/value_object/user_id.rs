//! User identifier, shared by the identity-provider user and its profile row.

pub use kernel::id::UserId;
