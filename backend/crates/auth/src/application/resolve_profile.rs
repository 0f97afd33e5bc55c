//! Resolve Profile Use Case
//!
//! Fetches the profile that decides the admin flag. Every failure degrades to
//! `None` so the caller ends up in the least-privileged state.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entity::profile::Profile;
use crate::domain::repository::ProfileRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthError;

pub struct ResolveProfileUseCase<P>
where
    P: ProfileRepository,
{
    profiles: Arc<P>,
    timeout: Duration,
}

impl<P> ResolveProfileUseCase<P>
where
    P: ProfileRepository,
{
    pub fn new(profiles: Arc<P>, timeout: Duration) -> Self {
        Self { profiles, timeout }
    }

    pub async fn execute(&self, user_id: &UserId) -> Option<Profile> {
        let result = match tokio::time::timeout(self.timeout, self.profiles.get_profile(user_id))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout),
        };

        match result {
            Ok(profile) if profile.id == *user_id => {
                tracing::debug!(
                    user_id = %user_id,
                    is_admin = profile.is_admin(),
                    "Profile resolved"
                );
                Some(profile)
            }
            Ok(profile) => {
                tracing::warn!(
                    user_id = %user_id,
                    profile_id = %profile.id,
                    error = %AuthError::ProfileMismatch,
                    "Profile fetch returned another user's row"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Profile fetch failed; continuing without profile"
                );
                None
            }
        }
    }
}
