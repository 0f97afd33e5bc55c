//! Sign Out Use Case
//!
//! Remote revocation is best-effort: a failure is logged and reported to the
//! caller as `false`, never as an error.

use std::sync::Arc;

use crate::domain::repository::SessionStore;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionStore,
{
    store: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns whether the backend acknowledged the sign-out
    pub async fn execute(&self) -> bool {
        match self.store.sign_out().await {
            Ok(()) => {
                tracing::info!("User signed out");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
                false
            }
        }
    }
}
