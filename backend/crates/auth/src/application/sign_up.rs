//! Sign Up Use Case
//!
//! Creates an account. The profile row is provisioned by the backend from the
//! forwarded metadata.

use std::sync::Arc;

use crate::domain::repository::{SessionStore, SignUpResult};
use crate::domain::value_object::{
    email::Email, password::RawPassword, sign_up_metadata::SignUpMetadata,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub metadata: SignUpMetadata,
}

/// Sign up use case
pub struct SignUpUseCase<S>
where
    S: SessionStore,
{
    store: Arc<S>,
}

impl<S> SignUpUseCase<S>
where
    S: SessionStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpResult> {
        let email = Email::new(input.email)
            .map_err(|e| AuthError::InvalidEmail(e.message().to_string()))?;
        let password = RawPassword::new(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.message().to_string()))?;

        let result = self
            .store
            .sign_up(&email, &password, &input.metadata)
            .await
            .inspect_err(|e| e.log())?;

        tracing::info!(
            user_id = %result.user.id,
            confirmation_pending = result.confirmation_pending(),
            "User signed up"
        );
        Ok(result)
    }
}
