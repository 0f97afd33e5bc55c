//! Auth Provider
//!
//! Handle to the auth state machine. Cloning is cheap; all clones talk to
//! the same worker task and observe the same [`AuthState`].
//!
//! ```text
//! start() ─ subscribe ─ spawn worker ─ initialize ─┐
//!                                                  ▼
//!   session events ──┐                      ┌─ watch<AuthState> ─▶ guards, views
//!                    ├──▶ worker (serial) ──┤
//!   commands ────────┘                      └─ navigator (sign-in, logout)
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{Notify, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::application::config::AuthConfig;
use crate::application::resolve_profile::ResolveProfileUseCase;
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::application::sign_out::SignOutUseCase;
use crate::application::sign_up::{SignUpInput, SignUpUseCase};
use crate::application::update_password::UpdatePasswordUseCase;
use crate::application::update_profile::UpdateProfileUseCase;
use crate::application::worker::{AuthWorker, Command};
use crate::domain::entity::{
    auth_state::AuthState,
    profile::{Profile, ProfileUpdate},
    session::Session,
    user::User,
};
use crate::domain::repository::{ProfileRepository, SessionStore, SignUpResult};
use crate::domain::value_object::sign_up_metadata::SignUpMetadata;
use crate::error::{AuthError, AuthResult};
use crate::presentation::navigation::Navigator;

pub struct AuthProvider<S, P>
where
    S: SessionStore,
    P: ProfileRepository,
{
    shared: Arc<Shared<S, P>>,
}

struct Shared<S, P>
where
    S: SessionStore,
    P: ProfileRepository,
{
    config: AuthConfig,
    sign_in: SignInUseCase<S>,
    sign_up: SignUpUseCase<S>,
    sign_out: SignOutUseCase<S>,
    update_password: UpdatePasswordUseCase<S>,
    update_profile: UpdateProfileUseCase<P>,
    navigator: Arc<dyn Navigator>,
    state: Arc<watch::Sender<AuthState>>,
    commands: mpsc::UnboundedSender<Command>,
    shutdown: Arc<Notify>,
    /// Session changes the worker has handled so far
    events_seen: Arc<AtomicU64>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<S, P> Clone for AuthProvider<S, P>
where
    S: SessionStore,
    P: ProfileRepository,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, P> AuthProvider<S, P>
where
    S: SessionStore + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    /// Subscribe to the store, spawn the worker and begin initialization
    ///
    /// Returns immediately with the state still loading; use [`ready`](Self::ready)
    /// to wait for the persisted session check. Must be called inside a tokio
    /// runtime.
    pub fn start(
        store: Arc<S>,
        profiles: Arc<P>,
        config: AuthConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        // Subscribe before the session check so no change is missed
        let events = store.subscribe();

        let state = Arc::new(watch::Sender::new(AuthState::loading()));
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(Notify::new());
        let events_seen = Arc::new(AtomicU64::new(0));

        let worker = AuthWorker::new(
            Arc::clone(&store),
            ResolveProfileUseCase::new(Arc::clone(&profiles), config.profile_fetch_timeout),
            Arc::clone(&state),
            commands_rx,
            events,
            Arc::clone(&shutdown),
            Arc::clone(&events_seen),
        );
        let handle = tokio::spawn(worker.run());

        let shared = Shared {
            sign_in: SignInUseCase::new(Arc::clone(&store)),
            sign_up: SignUpUseCase::new(Arc::clone(&store)),
            sign_out: SignOutUseCase::new(Arc::clone(&store)),
            update_password: UpdatePasswordUseCase::new(store),
            update_profile: UpdateProfileUseCase::new(profiles),
            config,
            navigator,
            state,
            commands,
            shutdown,
            events_seen,
            worker: Mutex::new(Some(handle)),
        };

        Self {
            shared: Arc::new(shared),
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Current snapshot
    pub fn state(&self) -> AuthState {
        self.shared.state.borrow().clone()
    }

    /// Receiver that is notified on every state replacement
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.shared.state.subscribe()
    }

    /// Wait for initialization (or a refresh) to finish
    pub async fn ready(&self) -> AuthState {
        self.wait_for(|s| !s.is_loading()).await
    }

    /// Wait until `predicate` holds for the published state
    pub async fn wait_for(&self, predicate: impl FnMut(&AuthState) -> bool) -> AuthState {
        let mut rx = self.subscribe();
        match rx.wait_for(predicate).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.shared.config
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Sign in and navigate to the dashboard
    ///
    /// On success the returned session is already reflected in the state
    /// together with the resolved profile, unless a later session change
    /// (such as a remote sign-out) superseded it. On failure nothing changes.
    pub async fn sign_in(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> AuthResult<Session> {
        let events_seen = self.shared.events_seen.load(Ordering::Acquire);
        let session = self
            .shared
            .sign_in
            .execute(SignInInput {
                email: email.into(),
                password: password.into(),
            })
            .await?;

        let established = self
            .request(|done| Command::Establish {
                session: session.clone(),
                events_seen,
                done,
            })
            .await;
        if !established {
            return Err(AuthError::Internal("Auth worker is not running".to_string()));
        }

        self.shared.navigator.navigate(&self.shared.config.dashboard_route);
        Ok(session)
    }

    /// Create an account; the auth state is left untouched
    pub async fn sign_up(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        metadata: SignUpMetadata,
    ) -> AuthResult<SignUpResult> {
        self.shared
            .sign_up
            .execute(SignUpInput {
                email: email.into(),
                password: password.into(),
                metadata,
            })
            .await
    }

    /// Sign out everywhere it can and always locally, then go to the login route
    pub async fn logout(&self) {
        let remote_ok = self.shared.sign_out.execute().await;

        if !self.request(|done| Command::Clear { done }).await {
            // Worker gone: the handle still holds the sender
            self.shared.state.send_replace(AuthState::signed_out());
        }

        tracing::debug!(remote_ok, "Logout complete");
        self.shared.navigator.navigate(&self.shared.config.login_route);
    }

    /// Re-fetch the profile and re-derive the admin flag; no-op when signed out
    pub async fn refresh_profile(&self) {
        if !self.state().is_authenticated() {
            return;
        }
        self.request(|done| Command::Refresh { done }).await;
    }

    /// Save profile fields and refresh the published profile
    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthResult<Profile> {
        let user_id = self
            .state()
            .user()
            .map(|u| u.id)
            .ok_or(AuthError::SessionInvalid)?;

        let profile = self.shared.update_profile.execute(&user_id, update).await?;
        self.refresh_profile().await;
        Ok(profile)
    }

    /// Change the current user's password
    pub async fn update_password(&self, new_password: impl Into<String>) -> AuthResult<User> {
        if !self.state().is_authenticated() {
            return Err(AuthError::SessionInvalid);
        }
        self.shared
            .update_password
            .execute(new_password.into())
            .await
    }

    /// Stop the worker and drop the session subscription
    pub async fn shutdown(&self) {
        self.shared.shutdown.notify_one();

        let handle = match self.shared.worker.lock() {
            Ok(mut worker) => worker.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Auth worker terminated abnormally");
            }
        }
    }

    async fn request(&self, command: impl FnOnce(oneshot::Sender<()>) -> Command) -> bool {
        let (done, ack) = oneshot::channel();
        if self.shared.commands.send(command(done)).is_err() {
            return false;
        }
        ack.await.is_ok()
    }
}
