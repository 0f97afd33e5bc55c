//! Update Profile Use Case
//!
//! Writes the editable profile fields from the settings page.

use std::sync::Arc;

use crate::domain::entity::profile::{Profile, ProfileUpdate};
use crate::domain::repository::ProfileRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

pub struct UpdateProfileUseCase<P>
where
    P: ProfileRepository,
{
    profiles: Arc<P>,
}

impl<P> UpdateProfileUseCase<P>
where
    P: ProfileRepository,
{
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    pub async fn execute(&self, user_id: &UserId, update: ProfileUpdate) -> AuthResult<Profile> {
        let update = ProfileUpdate {
            full_name: update.full_name.map(|v| v.trim().to_string()),
            company_name: update.company_name.map(|v| v.trim().to_string()),
            phone_number: update.phone_number.map(|v| v.trim().to_string()),
        };

        let profile = if update.is_empty() {
            self.profiles.get_profile(user_id).await?
        } else {
            self.profiles.update_profile(user_id, &update).await?
        };

        if profile.id != *user_id {
            return Err(AuthError::ProfileMismatch);
        }

        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(profile)
    }
}
