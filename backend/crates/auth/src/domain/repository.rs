//! Repository Traits
//!
//! Collaborator interfaces consumed by the auth state machine. Implementations
//! are in the infrastructure layer.

use crate::domain::entity::{
    profile::{Profile, ProfileUpdate},
    session::Session,
    user::User,
};
use crate::domain::subscription::SessionSubscription;
use crate::domain::value_object::{
    email::Email, password::RawPassword, sign_up_metadata::SignUpMetadata, user_id::UserId,
};
use crate::error::AuthResult;

/// Result of account creation
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: User,
    /// `None` while email confirmation is pending
    pub session: Option<Session>,
}

impl SignUpResult {
    pub fn confirmation_pending(&self) -> bool {
        self.session.is_none()
    }
}

/// Identity provider session store
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Persisted session, if one survives
    async fn get_session(&self) -> AuthResult<Option<Session>>;

    /// Validate credentials and establish a session
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> AuthResult<Session>;

    /// Create an account
    async fn sign_up(
        &self,
        email: &Email,
        password: &RawPassword,
        metadata: &SignUpMetadata,
    ) -> AuthResult<SignUpResult>;

    /// Terminate the current session
    async fn sign_out(&self) -> AuthResult<()>;

    /// Change the current user's password
    async fn update_password(&self, password: &RawPassword) -> AuthResult<User>;

    /// Register for change notifications; dropping the handle unsubscribes
    fn subscribe(&self) -> SessionSubscription;
}

/// Profile table access
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    /// Single row by id; `ProfileNotFound` when absent
    async fn get_profile(&self, user_id: &UserId) -> AuthResult<Profile>;

    /// Write the present fields and return the updated row
    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate)
    -> AuthResult<Profile>;
}
