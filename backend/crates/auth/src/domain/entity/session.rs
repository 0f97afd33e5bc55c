//! Session Entity
//!
//! Credential issued by the identity provider. The client only mirrors it;
//! the session store owns its lifecycle.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry as Unix milliseconds
    pub expires_at_ms: i64,
    pub user: User,
}

impl Session {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at_ms: i64,
        user: User,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at_ms,
            user,
        }
    }

    /// Session valid for `ttl_ms` from now
    pub fn issued_now(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        ttl_ms: i64,
        user: User,
    ) -> Self {
        Self::new(
            access_token,
            refresh_token,
            Utc::now().timestamp_millis().saturating_add(ttl_ms),
            user,
        )
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining_ms() <= 0
    }

    /// Milliseconds until expiry (negative when already expired)
    #[inline]
    pub fn remaining_ms(&self) -> i64 {
        self.expires_at_ms
            .saturating_sub(Utc::now().timestamp_millis())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at_ms", &self.expires_at_ms)
            .field("user_id", &self.user.id)
            .finish()
    }
}
