//! Hosted Backend Implementations
//!
//! Session store and profile repository over the hosted backend's HTTP API:
//! - auth: `/auth/v1/token`, `/auth/v1/signup`, `/auth/v1/logout`, `/auth/v1/user`
//! - rows: `/rest/v1/profiles?id=eq.<id>`
//!
//! The current session is cached in memory and, when a session file is
//! configured, persisted as JSON so it can be restored on the next start.

use chrono::Utc;
use platform::config::BackendConfig;
use platform::http::{BackendClient, Method};
use platform::storage::JsonFile;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

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
};
use crate::error::{AuthError, AuthResult};

const TOKEN_PATH: &str = "/auth/v1/token";
const SIGNUP_PATH: &str = "/auth/v1/signup";
const LOGOUT_PATH: &str = "/auth/v1/logout";
const USER_PATH: &str = "/auth/v1/user";
const PROFILES_PATH: &str = "/rest/v1/profiles";

/// Token lifetime assumed when the backend omits both expiry fields
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        // Out-of-range values from the backend clamp instead of wrapping
        let now = Utc::now().timestamp_millis();
        let expires_at_ms = match (self.expires_at, self.expires_in) {
            (Some(at), _) => at.saturating_mul(1000),
            (None, Some(secs)) => now.saturating_add(secs.saturating_mul(1000)),
            (None, None) => now.saturating_add(DEFAULT_EXPIRES_IN_SECS * 1000),
        };
        Session::new(self.access_token, self.refresh_token, expires_at_ms, self.user)
    }
}

/// Sign-up answers with a session, or with the bare user while confirmation
/// is pending
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(User),
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpBody<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a SignUpMetadata,
}

#[derive(Serialize)]
struct PasswordChange<'a> {
    password: &'a str,
}

// ============================================================================
// Backend
// ============================================================================

/// Hosted backend session store and profile repository
pub struct HostedBackend {
    client: BackendClient,
    session: RwLock<Option<Session>>,
    storage: Option<JsonFile>,
    broadcaster: SessionBroadcaster,
}

impl HostedBackend {
    pub fn new(config: &BackendConfig) -> AuthResult<Self> {
        let client = BackendClient::new(config)?;
        Ok(Self {
            client,
            session: RwLock::new(None),
            storage: config.session_file.clone().map(JsonFile::new),
            broadcaster: SessionBroadcaster::new(),
        })
    }

    /// Access token of the current session, if any
    async fn bearer(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Replace the cached session, persist it and notify subscribers
    async fn set_session(&self, session: Option<Session>, event: Option<AuthChangeEvent>) {
        *self.session.write().await = session.clone();

        if let Some(storage) = &self.storage {
            let result = match &session {
                Some(s) => storage.store(s).await,
                None => storage.clear().await,
            };
            if let Err(e) = result {
                tracing::warn!(path = %storage.path().display(), error = %e, "Failed to persist session");
            }
        }

        if let Some(event) = event {
            self.broadcaster.emit(SessionChange::new(event, session));
        }
    }

    async fn load_persisted(&self) -> Option<Session> {
        let storage = self.storage.as_ref()?;
        match storage.load::<Session>().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %storage.path().display(), error = %e, "Discarding unreadable session file");
                let _ = storage.clear().await;
                None
            }
        }
    }

    async fn refresh(&self, refresh_token: &str) -> AuthResult<Session> {
        let token: TokenResponse = self
            .client
            .send_json(
                Method::POST,
                TOKEN_PATH,
                None,
                &[("grant_type", "refresh_token")],
                &RefreshGrant { refresh_token },
                None,
            )
            .await?;
        Ok(token.into_session())
    }
}

impl SessionStore for HostedBackend {
    async fn get_session(&self) -> AuthResult<Option<Session>> {
        let cached = self.session.read().await.clone();
        let session = match cached {
            Some(session) => Some(session),
            None => self.load_persisted().await,
        };

        let Some(session) = session else {
            return Ok(None);
        };

        if !session.is_expired() {
            *self.session.write().await = Some(session.clone());
            return Ok(Some(session));
        }

        tracing::debug!(user_id = %session.user.id, "Stored session expired; refreshing");
        match self.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                self.set_session(Some(fresh.clone()), Some(AuthChangeEvent::TokenRefreshed))
                    .await;
                Ok(Some(fresh))
            }
            Err(e @ (AuthError::Transport(_) | AuthError::Timeout)) => Err(e),
            Err(e) => {
                tracing::info!(error = %e, "Stored session could not be refreshed; discarding");
                self.set_session(None, None).await;
                Ok(None)
            }
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &RawPassword,
    ) -> AuthResult<Session> {
        let token: TokenResponse = self
            .client
            .send_json(
                Method::POST,
                TOKEN_PATH,
                None,
                &[("grant_type", "password")],
                &PasswordGrant {
                    email: email.as_str(),
                    password: password.expose(),
                },
                None,
            )
            .await?;

        let session = token.into_session();
        self.set_session(Some(session.clone()), Some(AuthChangeEvent::SignedIn))
            .await;
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &RawPassword,
        metadata: &SignUpMetadata,
    ) -> AuthResult<SignUpResult> {
        let response: SignUpResponse = self
            .client
            .send_json(
                Method::POST,
                SIGNUP_PATH,
                None,
                &[],
                &SignUpBody {
                    email: email.as_str(),
                    password: password.expose(),
                    data: metadata,
                },
                None,
            )
            .await?;

        match response {
            SignUpResponse::Session(token) => {
                let session = token.into_session();
                self.set_session(Some(session.clone()), Some(AuthChangeEvent::SignedIn))
                    .await;
                Ok(SignUpResult {
                    user: session.user.clone(),
                    session: Some(session),
                })
            }
            SignUpResponse::User(user) => Ok(SignUpResult {
                user,
                session: None,
            }),
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let remote = match self.bearer().await {
            Some(token) => self
                .client
                .send_empty(Method::POST, LOGOUT_PATH, Some(&token))
                .await
                .map_err(AuthError::from),
            None => Ok(()),
        };

        // The local session goes regardless of the remote answer
        self.set_session(None, Some(AuthChangeEvent::SignedOut)).await;
        remote
    }

    async fn update_password(&self, password: &RawPassword) -> AuthResult<User> {
        let token = self.bearer().await.ok_or(AuthError::SessionInvalid)?;
        let user: User = self
            .client
            .send_json(
                Method::PUT,
                USER_PATH,
                Some(&token),
                &[],
                &PasswordChange {
                    password: password.expose(),
                },
                None,
            )
            .await?;

        let current = self.session.read().await.clone();
        if let Some(mut session) = current {
            session.user = user.clone();
            self.set_session(Some(session), Some(AuthChangeEvent::UserUpdated))
                .await;
        }
        Ok(user)
    }

    fn subscribe(&self) -> SessionSubscription {
        self.broadcaster.subscribe()
    }
}

impl ProfileRepository for HostedBackend {
    async fn get_profile(&self, user_id: &UserId) -> AuthResult<Profile> {
        let bearer = self.bearer().await;
        let filter = format!("eq.{}", user_id);
        let rows: Vec<Profile> = self
            .client
            .get_json(
                PROFILES_PATH,
                bearer.as_deref(),
                &[("id", filter.as_str()), ("select", "*")],
            )
            .await?;

        rows.into_iter().next().ok_or(AuthError::ProfileNotFound)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> AuthResult<Profile> {
        let bearer = self.bearer().await.ok_or(AuthError::SessionInvalid)?;
        let filter = format!("eq.{}", user_id);
        let rows: Vec<Profile> = self
            .client
            .send_json(
                Method::PATCH,
                PROFILES_PATH,
                Some(&bearer),
                &[("id", filter.as_str())],
                update,
                Some("return=representation"),
            )
            .await?;

        rows.into_iter().next().ok_or(AuthError::ProfileNotFound)
    }
}
