//! Session change notifications emitted by the session store

use derive_more::Display;

use super::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum AuthChangeEvent {
    #[display("INITIAL_SESSION")]
    InitialSession,
    #[display("SIGNED_IN")]
    SignedIn,
    #[display("SIGNED_OUT")]
    SignedOut,
    #[display("TOKEN_REFRESHED")]
    TokenRefreshed,
    #[display("USER_UPDATED")]
    UserUpdated,
    #[display("PASSWORD_RECOVERY")]
    PasswordRecovery,
}

impl AuthChangeEvent {
    pub fn from_code(code: &str) -> Option<Self> {
        use AuthChangeEvent::*;
        match code {
            "INITIAL_SESSION" => Some(InitialSession),
            "SIGNED_IN" => Some(SignedIn),
            "SIGNED_OUT" => Some(SignedOut),
            "TOKEN_REFRESHED" => Some(TokenRefreshed),
            "USER_UPDATED" => Some(UserUpdated),
            "PASSWORD_RECOVERY" => Some(PasswordRecovery),
            _ => None,
        }
    }
}

/// One notification: the event and the session after it
#[derive(Debug, Clone, PartialEq)]
pub struct SessionChange {
    pub event: AuthChangeEvent,
    pub session: Option<Session>,
}

impl SessionChange {
    pub fn new(event: AuthChangeEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }

    pub fn signed_in(session: Session) -> Self {
        Self::new(AuthChangeEvent::SignedIn, Some(session))
    }

    pub fn signed_out() -> Self {
        Self::new(AuthChangeEvent::SignedOut, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_codes() {
        for event in [
            AuthChangeEvent::InitialSession,
            AuthChangeEvent::SignedIn,
            AuthChangeEvent::SignedOut,
            AuthChangeEvent::TokenRefreshed,
            AuthChangeEvent::UserUpdated,
            AuthChangeEvent::PasswordRecovery,
        ] {
            assert_eq!(AuthChangeEvent::from_code(&event.to_string()), Some(event));
        }
        assert_eq!(AuthChangeEvent::from_code("MFA_CHALLENGE_VERIFIED"), None);
    }
}
