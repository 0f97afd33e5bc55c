//! View DTOs (Data Transfer Objects)

use serde::Serialize;

use crate::domain::entity::auth_state::{AuthPhase, AuthState};
use crate::domain::entity::profile::Profile;

// ============================================================================
// Auth State
// ============================================================================

/// Serializable snapshot of the auth state for the view layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStateView {
    pub phase: &'static str,
    pub is_loading: bool,
    pub is_admin: bool,
    pub user: Option<UserView>,
    pub profile: Option<ProfileView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub account_balance: Option<f64>,
}

impl From<&Profile> for ProfileView {
    fn from(p: &Profile) -> Self {
        Self {
            full_name: p.full_name.clone(),
            company_name: p.company_name.clone(),
            phone_number: p.phone_number.clone(),
            role: p.role.as_ref().map(|r| r.to_string()),
            account_balance: p.account_balance,
        }
    }
}

impl From<&AuthState> for AuthStateView {
    fn from(state: &AuthState) -> Self {
        let phase = match state.phase() {
            AuthPhase::Loading => "loading",
            AuthPhase::Unauthenticated => "unauthenticated",
            AuthPhase::Authenticated {
                profile_loaded: false,
            } => "authenticated",
            AuthPhase::Authenticated {
                profile_loaded: true,
            } => "ready",
        };

        Self {
            phase,
            is_loading: state.is_loading(),
            is_admin: state.is_admin(),
            user: state.user().map(|u| UserView {
                id: u.id.to_string(),
                email: u.email_str().to_string(),
            }),
            profile: state.profile().map(ProfileView::from),
        }
    }
}
