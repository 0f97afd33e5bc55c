//! Update Password Use Case

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::password::RawPassword;
use crate::error::{AuthError, AuthResult};

pub struct UpdatePasswordUseCase<S>
where
    S: SessionStore,
{
    store: Arc<S>,
}

impl<S> UpdatePasswordUseCase<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, new_password: String) -> AuthResult<User> {
        let password = RawPassword::new(new_password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;

        let user = self
            .store
            .update_password(&password)
            .await
            .inspect_err(|e| e.log())?;

        tracing::info!(user_id = %user.id, "Password updated");
        Ok(user)
    }
}
