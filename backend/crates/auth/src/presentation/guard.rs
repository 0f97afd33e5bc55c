//! Route Guard
//!
//! Pure render-or-redirect decision over an [`AuthState`], plus
//! [`GuardedRoute`], which turns repeated evaluations into at most one
//! navigation per distinct redirect.

use crate::application::config::AuthConfig;
use crate::domain::entity::auth_state::AuthState;
use crate::presentation::navigation::Navigator;

/// Requirements declared by a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOptions {
    pub require_auth: bool,
    pub require_admin: bool,
    /// Target when authentication is required but missing
    pub redirect_to: String,
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            require_auth: false,
            require_admin: false,
            redirect_to: "/login".to_string(),
        }
    }
}

impl GuardOptions {
    pub fn public() -> Self {
        Self::default()
    }

    pub fn authenticated() -> Self {
        Self {
            require_auth: true,
            ..Self::default()
        }
    }

    pub fn admin() -> Self {
        Self {
            require_auth: true,
            require_admin: true,
            ..Self::default()
        }
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = path.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// State not settled; show a neutral indicator
    Loading,
    Render,
    /// Render nothing and move to the route
    Redirect(String),
}

/// Application-wide guard settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Target for signed-in users lacking the admin role
    pub fallback_route: String,
    pub dashboard_route: String,
    pub admin_route: String,
    pub redirect_admin_from_dashboard: bool,
}

impl From<&AuthConfig> for GuardPolicy {
    fn from(config: &AuthConfig) -> Self {
        Self {
            fallback_route: config.dashboard_route.clone(),
            dashboard_route: config.dashboard_route.clone(),
            admin_route: config.admin_route.clone(),
            redirect_admin_from_dashboard: config.redirect_admin_from_dashboard,
        }
    }
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    options: GuardOptions,
    policy: GuardPolicy,
}

impl RouteGuard {
    pub fn new(options: GuardOptions, policy: GuardPolicy) -> Self {
        Self { options, policy }
    }

    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    /// Decide for `path` under `state`
    pub fn evaluate(&self, state: &AuthState, path: &str) -> GuardDecision {
        if state.is_loading() {
            return GuardDecision::Loading;
        }

        if self.options.require_auth && !state.is_authenticated() {
            return GuardDecision::Redirect(self.options.redirect_to.clone());
        }

        if self.options.require_admin && !state.is_admin() {
            return GuardDecision::Redirect(self.policy.fallback_route.clone());
        }

        if self.policy.redirect_admin_from_dashboard
            && !self.options.require_admin
            && state.is_admin()
            && path == self.policy.dashboard_route
        {
            return GuardDecision::Redirect(self.policy.admin_route.clone());
        }

        GuardDecision::Render
    }
}

/// A mounted route that issues redirects as edge-triggered effects
///
/// The last redirect target is remembered: evaluating again with the same
/// outcome does not navigate again. Rendering resets the memory; loading
/// leaves it untouched.
#[derive(Debug, Clone)]
pub struct GuardedRoute {
    guard: RouteGuard,
    path: String,
    last_redirect: Option<String>,
}

impl GuardedRoute {
    pub fn new(guard: RouteGuard, path: impl Into<String>) -> Self {
        Self {
            guard,
            path: path.into(),
            last_redirect: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Re-evaluate after a state change and navigate if a new redirect is due
    pub fn update(&mut self, state: &AuthState, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.guard.evaluate(state, &self.path);

        match &decision {
            GuardDecision::Redirect(target) => {
                if self.last_redirect.as_deref() != Some(target.as_str()) {
                    tracing::debug!(from = %self.path, to = %target, "Guard redirect");
                    navigator.navigate(target);
                    self.last_redirect = Some(target.clone());
                }
            }
            GuardDecision::Render => self.last_redirect = None,
            GuardDecision::Loading => {}
        }

        decision
    }
}
