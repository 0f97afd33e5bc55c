//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Where unauthenticated visitors are sent, and where logout lands
    pub login_route: String,
    /// Landing route after sign-in; fallback for non-admins on admin routes
    pub dashboard_route: String,
    /// Admin landing route
    pub admin_route: String,
    /// Send admins from the generic dashboard to the admin route
    pub redirect_admin_from_dashboard: bool,
    /// Upper bound on a single profile fetch
    pub profile_fetch_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_route: "/login".to_string(),
            dashboard_route: "/dashboard".to_string(),
            admin_route: "/dashboard/admin".to_string(),
            redirect_admin_from_dashboard: false,
            profile_fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl AuthConfig {
    /// Create config for development (short fetch timeout)
    pub fn development() -> Self {
        Self {
            profile_fetch_timeout: Duration::from_secs(3),
            ..Default::default()
        }
    }

    pub fn with_admin_redirect(mut self, enabled: bool) -> Self {
        self.redirect_admin_from_dashboard = enabled;
        self
    }

    pub fn with_profile_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.profile_fetch_timeout = timeout;
        self
    }
}
