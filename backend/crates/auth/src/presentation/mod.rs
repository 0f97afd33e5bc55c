//! Presentation Layer
//!
//! Route guarding, the route table, navigation and serializable views of
//! the auth state.

pub mod dto;
pub mod guard;
pub mod navigation;
pub mod routes;

// Re-exports
pub use guard::{GuardDecision, GuardOptions, GuardPolicy, GuardedRoute, RouteGuard};
pub use navigation::{Navigator, RecordingNavigator};
pub use routes::{ResolvedRoute, RouteDef, RouteTable};
