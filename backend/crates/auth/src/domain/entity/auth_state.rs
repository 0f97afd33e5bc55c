//! Auth State
//!
//! The value published to every observer. Fields are private so the
//! invariants cannot be broken from outside:
//! - no profile and no admin flag without a user
//! - the admin flag comes from the profile's role and nothing else
//! - a profile belonging to a different user is never attached

use super::{profile::Profile, user::User};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    user: Option<User>,
    profile: Option<Profile>,
    is_admin: bool,
    is_loading: bool,
}

/// Coarse lifecycle position derived from an [`AuthState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Loading,
    Unauthenticated,
    Authenticated { profile_loaded: bool },
}

impl AuthState {
    /// State before the persisted session has been checked
    pub fn loading() -> Self {
        Self {
            user: None,
            profile: None,
            is_admin: false,
            is_loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            is_loading: false,
            ..Self::loading()
        }
    }

    /// Signed-in state; `profile` is dropped if it belongs to someone else
    pub fn signed_in(user: User, profile: Option<Profile>) -> Self {
        let profile = profile.filter(|p| {
            let matches = p.id == user.id;
            if !matches {
                tracing::warn!(
                    user_id = %user.id,
                    profile_id = %p.id,
                    "Discarding profile that does not belong to the current user"
                );
            }
            matches
        });
        let is_admin = profile.as_ref().is_some_and(Profile::is_admin);

        Self {
            user: Some(user),
            profile,
            is_admin,
            is_loading: false,
        }
    }

    pub fn with_loading(mut self, is_loading: bool) -> Self {
        self.is_loading = is_loading;
        self
    }

    #[inline]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[inline]
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> AuthPhase {
        match (&self.user, self.is_loading) {
            (_, true) => AuthPhase::Loading,
            (None, false) => AuthPhase::Unauthenticated,
            (Some(_), false) => AuthPhase::Authenticated {
                profile_loaded: self.profile.is_some(),
            },
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}
