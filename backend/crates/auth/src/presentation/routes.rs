//! Route Table
//!
//! The Groop application's routes and the guard each one is mounted with.
//! Patterns are `/`-separated segments; a segment starting with `:` captures
//! one path segment.

use crate::application::config::AuthConfig;
use crate::presentation::guard::{GuardOptions, GuardPolicy, GuardedRoute, RouteGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: &'static str,
    pub pattern: &'static str,
    pub options: GuardOptions,
}

impl RouteDef {
    pub fn new(name: &'static str, pattern: &'static str, options: GuardOptions) -> Self {
        Self {
            name,
            pattern,
            options,
        }
    }

    /// Captured parameters if `path` matches this pattern
    fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let pattern: Vec<&str> = segments(self.pattern).collect();
        let path: Vec<&str> = segments(path).collect();
        if pattern.len() != path.len() {
            return None;
        }

        let mut params = Vec::new();
        for (want, got) in pattern.iter().zip(&path) {
            match want.strip_prefix(':') {
                Some(name) => params.push((name.to_string(), (*got).to_string())),
                None if want == got => {}
                None => return None,
            }
        }
        Some(params)
    }
}

/// Outcome of looking up a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub route: &'a RouteDef,
    /// Path without query string or trailing slash
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl ResolvedRoute<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_not_found(&self) -> bool {
        self.route.name == NOT_FOUND
    }
}

const NOT_FOUND: &str = "not_found";

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    not_found: RouteDef,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self {
            routes,
            not_found: RouteDef::new(NOT_FOUND, "*", GuardOptions::public()),
        }
    }

    /// Routes of the Groop web application
    pub fn groop() -> Self {
        let admin = || GuardOptions::admin().redirect_to("/dashboard");

        Self::new(vec![
            // Public
            RouteDef::new("home", "/", GuardOptions::public()),
            RouteDef::new("login", "/login", GuardOptions::public()),
            RouteDef::new("signup", "/signup", GuardOptions::public()),
            RouteDef::new("blog", "/blog", GuardOptions::public()),
            RouteDef::new("blog_post", "/blog/:id", GuardOptions::public()),
            // Dashboard
            RouteDef::new("dashboard", "/dashboard", GuardOptions::authenticated()),
            RouteDef::new("shipments", "/dashboard/shipments", GuardOptions::authenticated()),
            RouteDef::new("shipment_new", "/dashboard/shipments/new", GuardOptions::authenticated()),
            RouteDef::new("vendors", "/dashboard/vendors", GuardOptions::authenticated()),
            RouteDef::new("vendor_new", "/dashboard/vendors/new", GuardOptions::authenticated()),
            RouteDef::new("containers", "/dashboard/containers", GuardOptions::authenticated()),
            RouteDef::new("documents", "/dashboard/documents", GuardOptions::authenticated()),
            RouteDef::new("document_new", "/dashboard/documents/new", GuardOptions::authenticated()),
            RouteDef::new("settings", "/dashboard/settings", GuardOptions::authenticated()),
            // Admin
            RouteDef::new("admin", "/dashboard/admin", admin()),
            RouteDef::new("blog_admin", "/dashboard/blog", admin()),
            RouteDef::new("blog_admin_new", "/dashboard/blog/new", admin()),
            RouteDef::new("blog_admin_edit", "/dashboard/blog/:id/edit", admin()),
        ])
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// First matching route, or the not-found route
    pub fn resolve(&self, path: &str) -> ResolvedRoute<'_> {
        let path = normalize(path);
        for route in &self.routes {
            if let Some(params) = route.matches(&path) {
                return ResolvedRoute {
                    route,
                    path,
                    params,
                };
            }
        }
        ResolvedRoute {
            route: &self.not_found,
            path,
            params: Vec::new(),
        }
    }

    /// Mount the guard for `path`
    pub fn mount(&self, path: &str, config: &AuthConfig) -> GuardedRoute {
        let resolved = self.resolve(path);
        let guard = RouteGuard::new(resolved.route.options.clone(), GuardPolicy::from(config));
        GuardedRoute::new(guard, resolved.path)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{}", joined)
}
