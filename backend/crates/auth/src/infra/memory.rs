//! In-Memory Backend
//!
//! Session store and profile table kept in process. Behaves like the hosted
//! backend (change events, a customer profile provisioned at sign-up) and
//! exposes knobs to inject failures and latency. Used by tests and the
//! console's offline mode.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::domain::entity::{
    profile::{Profile, ProfileUpdate},
    session::Session,
    session_change::{AuthChangeEvent, SessionChange},
    user::User,
};
use crate::domain::repository::{ProfileRepository, SessionStore, SignUpResult};
use crate::domain::subscription::{SessionBroadcaster, SessionSubscription};
use crate::domain::value_object::{
    email::Email, password::RawPassword, sign_up_metadata::SignUpMetadata, user_id::UserId,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Session lifetime handed out by the in-memory store (1 hour)
const SESSION_TTL_MS: i64 = 3_600_000;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<Email, Account>,
    profiles: HashMap<UserId, Profile>,
    session: Option<Session>,
    token_seq: u64,
    require_confirmation: bool,
    fail_get_session: bool,
    fail_sign_out: bool,
    fail_profiles: bool,
    profile_latency: Duration,
    profile_latency_for: HashMap<UserId, Duration>,
    /// Rows returned in place of the requested one
    profile_override: HashMap<UserId, Profile>,
    profile_fetches: usize,
}

impl MemoryState {
    fn mint_session(&mut self, user: &User) -> Session {
        self.token_seq += 1;
        Session::issued_now(
            format!("mem-access-{}", self.token_seq),
            format!("mem-refresh-{}", self.token_seq),
            SESSION_TTL_MS,
            user.clone(),
        )
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<MemoryState>,
    broadcaster: SessionBroadcaster,
}

/// In-process session store and profile repository
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Inner>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.inner.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // ========================================================================
    // Fixtures
    // ========================================================================

    /// Confirmed account with a profile carrying `role`
    pub fn add_account(&self, email: &str, password: &str, role: Option<UserRole>) -> User {
        let email = Email::from_backend(email.trim().to_lowercase());
        let user = User::new(UserId::new(), email.clone());

        let mut profile = Profile::new(user.id, role);
        profile.email = Some(email.as_str().to_string());

        let mut state = self.lock();
        state.profiles.insert(user.id, profile);
        state.accounts.insert(
            email,
            Account {
                user: user.clone(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        user
    }

    /// Store a session as if it survived a restart; emits nothing
    pub fn persist_session_for(&self, email: &str) -> Option<Session> {
        let mut state = self.lock();
        let user = state
            .accounts
            .get(&Email::from_backend(email.trim().to_lowercase()))?
            .user
            .clone();
        let session = state.mint_session(&user);
        state.session = Some(session.clone());
        Some(session)
    }

    /// Fresh session for `user` without touching the stored one
    pub fn session_for(&self, user: &User) -> Session {
        self.lock().mint_session(user)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    pub fn set_role(&self, user_id: &UserId, role: Option<UserRole>) {
        if let Some(profile) = self.lock().profiles.get_mut(user_id) {
            profile.role = role;
        }
    }

    pub fn remove_profile(&self, user_id: &UserId) {
        self.lock().profiles.remove(user_id);
    }

    pub fn profile(&self, user_id: &UserId) -> Option<Profile> {
        self.lock().profiles.get(user_id).cloned()
    }

    /// Answer fetches for `user_id` with `row` instead of the real one
    pub fn override_profile(&self, user_id: &UserId, row: Profile) {
        self.lock().profile_override.insert(*user_id, row);
    }

    // ========================================================================
    // Failure and latency injection
    // ========================================================================

    pub fn set_require_confirmation(&self, enabled: bool) {
        self.lock().require_confirmation = enabled;
    }

    pub fn set_fail_get_session(&self, enabled: bool) {
        self.lock().fail_get_session = enabled;
    }

    pub fn set_fail_sign_out(&self, enabled: bool) {
        self.lock().fail_sign_out = enabled;
    }

    pub fn set_fail_profiles(&self, enabled: bool) {
        self.lock().fail_profiles = enabled;
    }

    pub fn set_profile_latency(&self, latency: Duration) {
        self.lock().profile_latency = latency;
    }

    pub fn set_profile_latency_for(&self, user_id: &UserId, latency: Duration) {
        self.lock().profile_latency_for.insert(*user_id, latency);
    }

    // ========================================================================
    // Observation and event injection
    // ========================================================================

    /// Number of profile fetches served so far
    pub fn profile_fetches(&self) -> usize {
        self.lock().profile_fetches
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.broadcaster.subscriber_count()
    }

    /// Deliver a change to subscribers as the identity provider would
    pub fn emit(&self, change: SessionChange) {
        self.inner.broadcaster.emit(change);
    }
}

impl SessionStore for InMemoryBackend {
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        let mut state = self.lock();
        if state.fail_get_session {
            return Err(AuthError::Transport("session storage unavailable".to_string()));
        }
        if state.session.as_ref().is_some_and(Session::is_expired) {
            state.session = None;
        }
        Ok(state.session.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> AuthResult<Session> {
        let session = {
            let mut state = self.lock();
            let account = match state.accounts.get(email) {
                Some(account) if account.password == password.expose() => account.clone(),
                _ => return Err(AuthError::InvalidCredentials),
            };
            if !account.confirmed {
                return Err(AuthError::EmailNotConfirmed);
            }
            let session = state.mint_session(&account.user);
            state.session = Some(session.clone());
            session
        };

        self.emit(SessionChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &RawPassword,
        metadata: &SignUpMetadata,
    ) -> AuthResult<SignUpResult> {
        let result = {
            let mut state = self.lock();
            if state.accounts.contains_key(email) {
                return Err(AuthError::UserAlreadyRegistered);
            }

            let mut user = User::new(UserId::new(), email.clone());
            if let Ok(serde_json::Value::Object(map)) = serde_json::to_value(metadata) {
                user.user_metadata = map;
            }

            // Provisioned like the backend trigger does
            let mut profile = Profile::new(user.id, Some(UserRole::Customer));
            profile.email = Some(email.as_str().to_string());
            profile.full_name = Some(metadata.full_name.clone());
            profile.company_name = Some(metadata.company_name.clone());
            profile.phone_number = Some(metadata.phone_number.clone());
            state.profiles.insert(user.id, profile);

            let confirmed = !state.require_confirmation;
            state.accounts.insert(
                email.clone(),
                Account {
                    user: user.clone(),
                    password: password.expose().to_string(),
                    confirmed,
                },
            );

            let session = confirmed.then(|| state.mint_session(&user));
            if let Some(session) = &session {
                state.session = Some(session.clone());
            }
            SignUpResult { user, session }
        };

        if let Some(session) = &result.session {
            self.emit(SessionChange::signed_in(session.clone()));
        }
        Ok(result)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        {
            let mut state = self.lock();
            if state.fail_sign_out {
                return Err(AuthError::Transport("connection reset by peer".to_string()));
            }
            state.session = None;
        }

        self.emit(SessionChange::signed_out());
        Ok(())
    }

    async fn update_password(&self, password: &RawPassword) -> AuthResult<User> {
        let session = {
            let mut state = self.lock();
            let session = state.session.clone().ok_or(AuthError::SessionInvalid)?;
            let email = session.user.email.clone().ok_or(AuthError::SessionInvalid)?;
            let account = state
                .accounts
                .get_mut(&email)
                .ok_or(AuthError::SessionInvalid)?;
            account.password = password.expose().to_string();
            session
        };

        let user = session.user.clone();
        self.emit(SessionChange::new(AuthChangeEvent::UserUpdated, Some(session)));
        Ok(user)
    }

    fn subscribe(&self) -> SessionSubscription {
        self.inner.broadcaster.subscribe()
    }
}

impl ProfileRepository for InMemoryBackend {
    async fn get_profile(&self, user_id: &UserId) -> AuthResult<Profile> {
        let latency = {
            let mut state = self.lock();
            state.profile_fetches += 1;
            state
                .profile_latency_for
                .get(user_id)
                .copied()
                .unwrap_or(state.profile_latency)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let state = self.lock();
        if state.fail_profiles {
            return Err(AuthError::Backend {
                status: 503,
                message: "profiles table unavailable".to_string(),
            });
        }
        if let Some(row) = state.profile_override.get(user_id) {
            return Ok(row.clone());
        }
        state
            .profiles
            .get(user_id)
            .cloned()
            .ok_or(AuthError::ProfileNotFound)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> AuthResult<Profile> {
        let mut state = self.lock();
        if state.fail_profiles {
            return Err(AuthError::Backend {
                status: 503,
                message: "profiles table unavailable".to_string(),
            });
        }
        let profile = state
            .profiles
            .get_mut(user_id)
            .ok_or(AuthError::ProfileNotFound)?;
        profile.apply(update);
        Ok(profile.clone())
    }
}
