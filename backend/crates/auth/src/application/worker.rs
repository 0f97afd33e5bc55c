//! Auth state worker
//!
//! The only writer of [`AuthState`]. One task owns the session subscription
//! and the command queue and handles one item at a time to completion,
//! profile fetch included, so two writes can never interleave.
//!
//! Subscription events are polled before commands. A command is always sent
//! after the store call that emitted its events, so handling the buffered
//! events first keeps the two paths in arrival order.
//!
//! Every handled event bumps a shared counter. `Establish` carries the value
//! its sender saw before the store call and is dropped once the counter has
//! moved: a later event already decided the state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Notify, mpsc, oneshot, watch};

use crate::application::resolve_profile::ResolveProfileUseCase;
use crate::domain::entity::{
    auth_state::AuthState,
    session::Session,
    session_change::{AuthChangeEvent, SessionChange},
};
use crate::domain::repository::{ProfileRepository, SessionStore};
use crate::domain::subscription::SessionSubscription;

/// Requests from provider handles
#[derive(Debug)]
pub(crate) enum Command {
    /// Adopt a session returned directly by sign-in
    Establish {
        session: Session,
        /// Events handled when the sign-in started
        events_seen: u64,
        done: oneshot::Sender<()>,
    },
    /// Re-fetch the current user's profile
    Refresh { done: oneshot::Sender<()> },
    /// Drop the local session
    Clear { done: oneshot::Sender<()> },
}

pub(crate) struct AuthWorker<S, P>
where
    S: SessionStore,
    P: ProfileRepository,
{
    store: Arc<S>,
    profiles: ResolveProfileUseCase<P>,
    state: Arc<watch::Sender<AuthState>>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: SessionSubscription,
    shutdown: Arc<Notify>,
    events_seen: Arc<AtomicU64>,
    /// Read-only mirror of the store's session
    session: Option<Session>,
}

impl<S, P> AuthWorker<S, P>
where
    S: SessionStore + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    pub(crate) fn new(
        store: Arc<S>,
        profiles: ResolveProfileUseCase<P>,
        state: Arc<watch::Sender<AuthState>>,
        commands: mpsc::UnboundedReceiver<Command>,
        events: SessionSubscription,
        shutdown: Arc<Notify>,
        events_seen: Arc<AtomicU64>,
    ) -> Self {
        Self {
            store,
            profiles,
            state,
            commands,
            events,
            shutdown,
            events_seen,
            session: None,
        }
    }

    pub(crate) async fn run(mut self) {
        tracing::debug!("Auth worker started");
        self.initialize().await;

        let mut events_open = true;
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.notified() => {
                    tracing::debug!("Auth worker received shutdown signal");
                    break;
                }
                change = self.events.next(), if events_open => match change {
                    Some(change) => self.on_session_changed(change).await,
                    None => {
                        tracing::debug!("Session store closed the subscription");
                        events_open = false;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => break,
                },
            }
        }

        tracing::info!("Auth worker stopped");
    }

    async fn initialize(&mut self) {
        self.publish(AuthState::loading());

        match self.store.get_session().await {
            Ok(Some(session)) => {
                let user = session.user.clone();
                self.session = Some(session);
                self.publish(AuthState::signed_in(user.clone(), None).with_loading(true));

                let profile = self.profiles.execute(&user.id).await;
                self.publish(AuthState::signed_in(user, profile));
            }
            Ok(None) => self.publish(AuthState::signed_out()),
            Err(e) => {
                e.log();
                tracing::warn!(error = %e, "Could not restore session; starting signed out");
                self.publish(AuthState::signed_out());
            }
        }

        let state = self.state.borrow().clone();
        tracing::info!(
            authenticated = state.is_authenticated(),
            is_admin = state.is_admin(),
            "Auth state initialized"
        );
    }

    async fn on_session_changed(&mut self, change: SessionChange) {
        let SessionChange { event, session } = change;
        self.events_seen.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(event = %event, has_session = session.is_some(), "Session change");

        match (event, session) {
            (AuthChangeEvent::SignedIn, Some(session)) => self.establish(session).await,
            (AuthChangeEvent::SignedOut, _) => self.clear(),
            (AuthChangeEvent::TokenRefreshed | AuthChangeEvent::UserUpdated, Some(session)) => {
                self.renew(session).await
            }
            (AuthChangeEvent::InitialSession, _) => {}
            (event, _) => {
                tracing::debug!(event = %event, "Ignoring session change");
            }
        }
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Establish {
                session,
                events_seen,
                done,
            } => {
                if self.events_seen.load(Ordering::Acquire) == events_seen {
                    self.establish(session).await;
                } else {
                    tracing::debug!(
                        user_id = %session.user.id,
                        "Session changes handled since sign-in; keeping current state"
                    );
                }
                let _ = done.send(());
            }
            Command::Refresh { done } => {
                self.refresh_profile().await;
                let _ = done.send(());
            }
            Command::Clear { done } => {
                self.clear();
                let _ = done.send(());
            }
        }
    }

    /// Adopt `session` and publish the user together with their profile
    async fn establish(&mut self, session: Session) {
        if self.is_current(&session) {
            tracing::debug!(user_id = %session.user.id, "Session already established");
            return;
        }

        let user = session.user.clone();
        self.session = Some(session);

        let profile = self.profiles.execute(&user.id).await;
        tracing::info!(
            user_id = %user.id,
            is_admin = profile.as_ref().is_some_and(|p| p.is_admin()),
            "Session established"
        );
        self.publish(AuthState::signed_in(user, profile));
    }

    /// Token refresh or user record change; the profile is kept for the same user
    async fn renew(&mut self, session: Session) {
        let current = self.state.borrow().clone();
        match current.user() {
            Some(user) if user.id == session.user.id => {
                let user = session.user.clone();
                self.session = Some(session);
                self.publish(
                    AuthState::signed_in(user, current.profile().cloned())
                        .with_loading(current.is_loading()),
                );
            }
            _ => self.establish(session).await,
        }
    }

    async fn refresh_profile(&mut self) {
        let current = self.state.borrow().clone();
        let Some(user) = current.user().cloned() else {
            return;
        };

        self.publish(current.with_loading(true));
        let profile = self.profiles.execute(&user.id).await;
        self.publish(AuthState::signed_in(user, profile));
    }

    fn clear(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(user_id = %session.user.id, "Session cleared");
        }
        self.publish(AuthState::signed_out());
    }

    fn is_current(&self, session: &Session) -> bool {
        let same_token = self
            .session
            .as_ref()
            .is_some_and(|s| s.access_token == session.access_token);
        same_token
            && self
                .state
                .borrow()
                .user()
                .is_some_and(|u| u.id == session.user.id)
    }

    /// Replace the whole state in one write; unchanged values are not re-sent
    fn publish(&self, next: AuthState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
