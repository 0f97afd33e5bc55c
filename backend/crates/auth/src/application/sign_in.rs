//! Sign In Use Case
//!
//! Validates credentials against the session store.

use std::sync::Arc;

use crate::domain::entity::session::Session;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::{email::Email, password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<S>
where
    S: SessionStore,
{
    store: Arc<S>,
}

impl<S> SignInUseCase<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<Session> {
        let email = Email::new(input.email)
            .map_err(|e| AuthError::InvalidEmail(e.message().to_string()))?;
        let password = RawPassword::for_sign_in(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;

        let session = self
            .store
            .sign_in_with_password(&email, &password)
            .await
            .inspect_err(|e| e.log())?;

        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }
}
