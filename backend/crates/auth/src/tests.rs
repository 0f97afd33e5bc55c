//! Scenario tests for the auth state machine
//! Runs the provider against the in-memory backend

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use crate::application::config::AuthConfig;
    use crate::application::provider::AuthProvider;
    use crate::domain::entity::auth_state::AuthState;
    use crate::infra::memory::InMemoryBackend;
    use crate::presentation::navigation::RecordingNavigator;

    pub type MemoryProvider = AuthProvider<InMemoryBackend, InMemoryBackend>;

    pub struct Harness {
        pub backend: InMemoryBackend,
        pub provider: MemoryProvider,
        pub nav: Arc<RecordingNavigator>,
        pub seen: Arc<Mutex<Vec<AuthState>>>,
    }

    impl Harness {
        pub fn start(backend: InMemoryBackend) -> Self {
            Self::start_with(backend, AuthConfig::default())
        }

        pub fn start_with(backend: InMemoryBackend, config: AuthConfig) -> Self {
            let shared = Arc::new(backend.clone());
            let nav = Arc::new(RecordingNavigator::new());
            let provider = AuthProvider::start(shared.clone(), shared, config, nav.clone());
            let seen = record(&provider);
            Self {
                backend,
                provider,
                nav,
                seen,
            }
        }

        /// Every snapshot observed so far, checked against the state invariants
        pub fn assert_consistent_history(&self) {
            let seen = self.seen.lock().unwrap();
            assert!(!seen.is_empty());
            for state in seen.iter() {
                assert_invariants(state);
            }
        }
    }

    fn record(provider: &MemoryProvider) -> Arc<Mutex<Vec<AuthState>>> {
        let mut rx = provider.subscribe();
        let seen = Arc::new(Mutex::new(vec![rx.borrow_and_update().clone()]));
        let sink = seen.clone();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                sink.lock().unwrap().push(state);
            }
        });
        seen
    }

    pub fn assert_invariants(state: &AuthState) {
        match state.user() {
            None => {
                assert!(state.profile().is_none(), "profile without user: {:?}", state);
                assert!(!state.is_admin(), "admin without user: {:?}", state);
            }
            Some(user) => {
                if let Some(profile) = state.profile() {
                    assert_eq!(profile.id, user.id, "mismatched pair: {:?}", state);
                }
            }
        }
        let derived = state.profile().is_some_and(|p| p.is_admin());
        assert_eq!(state.is_admin(), derived, "admin flag not derived: {:?}", state);
    }
}

#[cfg(test)]
mod lifecycle_tests {
    use std::time::Duration;

    use super::support::*;
    use crate::application::config::AuthConfig;
    use crate::domain::entity::auth_state::AuthPhase;
    use crate::domain::entity::session_change::{AuthChangeEvent, SessionChange};
    use crate::domain::value_object::user_role::UserRole;
    use crate::infra::memory::InMemoryBackend;

    #[tokio::test]
    async fn test_initialize_without_session() {
        let h = Harness::start(InMemoryBackend::new());
        let state = h.provider.ready().await;

        assert!(state.user().is_none());
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
        assert!(!state.is_loading());
        assert_eq!(state.phase(), AuthPhase::Unauthenticated);
        assert!(h.nav.is_empty());
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_initialize_restores_admin_session() {
        let backend = InMemoryBackend::new();
        let u1 = backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();

        let h = Harness::start(backend);
        let state = h.provider.ready().await;

        assert_eq!(state.user().map(|u| u.id), Some(u1.id));
        assert_eq!(state.profile().and_then(|p| p.role.clone()), Some(UserRole::Admin));
        assert!(state.is_admin());
        assert!(!state.is_loading());
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_loading_ends_when_session_lookup_fails() {
        let backend = InMemoryBackend::new();
        backend.set_fail_get_session(true);

        let h = Harness::start(backend);
        let state = h.provider.ready().await;
        assert!(!state.is_loading());
        assert!(state.user().is_none());
    }

    #[tokio::test]
    async fn test_profile_failure_at_startup_is_not_admin() {
        let backend = InMemoryBackend::new();
        let user = backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();
        backend.set_fail_profiles(true);

        let h = Harness::start(backend);
        let state = h.provider.ready().await;

        assert_eq!(state.user().map(|u| u.id), Some(user.id));
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
        assert_eq!(
            state.phase(),
            AuthPhase::Authenticated {
                profile_loaded: false
            }
        );
    }

    #[tokio::test]
    async fn test_missing_profile_row_is_not_admin() {
        let backend = InMemoryBackend::new();
        let user = backend.add_account("a@b.com", "right-pass", Some(UserRole::Admin));
        backend.remove_profile(&user.id);
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        let state = h.provider.ready().await;
        assert!(state.is_authenticated());
        assert!(!state.is_admin());
    }

    #[tokio::test]
    async fn test_slow_profile_fetch_times_out() {
        let backend = InMemoryBackend::new();
        backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();
        backend.set_profile_latency(Duration::from_millis(500));

        let config = AuthConfig::default().with_profile_fetch_timeout(Duration::from_millis(20));
        let h = Harness::start_with(backend, config);
        let state = h.provider.ready().await;

        assert!(state.is_authenticated());
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
    }

    #[tokio::test]
    async fn test_events_wait_for_initialization() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Customer));
        backend.persist_session_for("a@b.com").unwrap();
        backend.set_profile_latency(Duration::from_millis(50));

        let h = Harness::start(backend);
        // Delivered while the startup profile fetch is still in flight
        h.backend.emit(SessionChange::signed_out());

        let state = h
            .provider
            .wait_for(|s| !s.is_loading() && !s.is_authenticated())
            .await;
        assert!(state.profile().is_none());
        assert_eq!(h.backend.profile_fetches(), 1);
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_remote_sign_out_event_clears_state() {
        let backend = InMemoryBackend::new();
        backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();

        let h = Harness::start(backend);
        assert!(h.provider.ready().await.is_admin());

        h.backend.emit(SessionChange::signed_out());
        let state = h.provider.wait_for(|s| !s.is_authenticated()).await;
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_overlapping_sign_ins_never_mismatch() {
        let backend = InMemoryBackend::new();
        let a = backend.add_account("a@groop.example", "pass-a", Some(UserRole::Admin));
        let b = backend.add_account("b@groop.example", "pass-b", Some(UserRole::Customer));
        backend.set_profile_latency_for(&a.id, Duration::from_millis(80));
        backend.set_profile_latency_for(&b.id, Duration::from_millis(5));

        let h = Harness::start(backend);
        h.provider.ready().await;

        h.backend.emit(SessionChange::signed_in(h.backend.session_for(&a)));
        h.backend.emit(SessionChange::signed_in(h.backend.session_for(&b)));

        let state = h
            .provider
            .wait_for(|s| s.user().is_some_and(|u| u.id == b.id))
            .await;
        assert_eq!(state.profile().map(|p| p.id), Some(b.id));
        assert!(!state.is_admin());
        assert_eq!(h.backend.profile_fetches(), 2);
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_foreign_profile_row_is_discarded() {
        let backend = InMemoryBackend::new();
        let a = backend.add_account("a@groop.example", "pass-a", Some(UserRole::Customer));
        let admin = backend.add_account("root@groop.example", "pass-r", Some(UserRole::Admin));
        backend.override_profile(&a.id, backend.profile(&admin.id).unwrap());
        backend.persist_session_for("a@groop.example").unwrap();

        let h = Harness::start(backend);
        let state = h.provider.ready().await;
        assert_eq!(state.user().map(|u| u.id), Some(a.id));
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
    }

    #[tokio::test]
    async fn test_token_refresh_keeps_profile_without_refetch() {
        let backend = InMemoryBackend::new();
        let user = backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();

        let h = Harness::start(backend);
        h.provider.ready().await;
        assert_eq!(h.backend.profile_fetches(), 1);

        let refreshed = h.backend.session_for(&user);
        h.backend.emit(SessionChange::new(
            AuthChangeEvent::TokenRefreshed,
            Some(refreshed),
        ));
        // A later command is handled after the event
        h.provider.refresh_profile().await;

        let state = h.provider.state();
        assert!(state.is_admin());
        assert_eq!(h.backend.profile_fetches(), 2);
    }

    #[tokio::test]
    async fn test_unhandled_events_are_ignored() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", None);
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        let before = h.provider.ready().await;

        h.backend
            .emit(SessionChange::new(AuthChangeEvent::PasswordRecovery, None));
        h.backend
            .emit(SessionChange::new(AuthChangeEvent::InitialSession, None));
        h.provider.refresh_profile().await;

        assert_eq!(h.provider.state().user(), before.user());
    }

    #[tokio::test]
    async fn test_shutdown_unsubscribes() {
        let backend = InMemoryBackend::new();
        let h = Harness::start(backend);
        h.provider.ready().await;
        assert_eq!(h.backend.subscriber_count(), 1);

        h.provider.shutdown().await;
        assert_eq!(h.backend.subscriber_count(), 0);
    }
}

#[cfg(test)]
mod operation_tests {
    use std::time::Duration;

    use crate::domain::entity::auth_state::AuthPhase;
    use super::support::*;
    use crate::domain::entity::profile::ProfileUpdate;
    use crate::domain::value_object::{sign_up_metadata::SignUpMetadata, user_role::UserRole};
    use crate::error::AuthError;
    use crate::infra::memory::InMemoryBackend;

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", None);

        let h = Harness::start(backend);
        h.provider.ready().await;

        let err = h.provider.sign_in("a@b.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(err.is_credential_error());

        let state = h.provider.state();
        assert!(state.user().is_none());
        assert!(h.nav.is_empty());
        assert_eq!(h.backend.profile_fetches(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_malformed_email_locally() {
        let h = Harness::start(InMemoryBackend::new());
        h.provider.ready().await;

        let err = h.provider.sign_in("not-an-email", "whatever").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
        assert!(h.nav.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let backend = InMemoryBackend::new();
        let user = backend.add_account("a@b.com", "right-pass", Some(UserRole::Admin));

        let h = Harness::start(backend);
        h.provider.ready().await;

        let session = h.provider.sign_in("A@B.com", "right-pass").await.unwrap();
        assert_eq!(session.user.id, user.id);

        let state = h.provider.state();
        assert_eq!(state.user().map(|u| u.id), Some(user.id));
        assert!(state.is_admin());
        assert_eq!(h.nav.history(), vec!["/dashboard"]);
        // The SIGNED_IN event and the direct result share one fetch
        assert_eq!(h.backend.profile_fetches(), 1);
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_remote_sign_out_during_sign_in_wins() {
        use crate::domain::repository::SessionStore;

        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Admin));
        backend.set_profile_latency(Duration::from_millis(100));

        let h = Harness::start(backend);
        h.provider.ready().await;

        let provider = h.provider.clone();
        let sign_in =
            tokio::spawn(async move { provider.sign_in("a@b.com", "right-pass").await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        // Another tab signs out while the profile is still loading
        h.backend.sign_out().await.unwrap();

        sign_in.await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        let state = h.provider.state();
        assert!(h.backend.current_session().is_none());
        assert!(state.user().is_none(), "stale sign-in resurrected: {:?}", state);
        assert!(!state.is_admin());
        assert_eq!(state.phase(), AuthPhase::Unauthenticated);
        assert_eq!(h.backend.profile_fetches(), 1);
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation_leaves_state_alone() {
        let backend = InMemoryBackend::new();
        backend.set_require_confirmation(true);

        let h = Harness::start(backend);
        let before = h.provider.ready().await;

        let result = h
            .provider
            .sign_up(
                "new@groop.example",
                "secret1",
                SignUpMetadata::new("New", "Acme", "555").with_extra("source", "expo"),
            )
            .await
            .unwrap();
        assert!(result.confirmation_pending());
        assert_eq!(result.user.user_metadata["full_name"], "New");

        h.provider.refresh_profile().await;
        assert_eq!(h.provider.state(), before);
        assert!(h.nav.is_empty());
    }

    #[tokio::test]
    async fn test_sign_up_password_policy() {
        let h = Harness::start(InMemoryBackend::new());
        h.provider.ready().await;

        let err = h
            .provider
            .sign_up("new@groop.example", "12345", SignUpMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordValidation(_)));

        let err = h
            .provider
            .sign_in("new@groop.example", "12345")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_sign_up_duplicate_email() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", None);

        let h = Harness::start(backend);
        h.provider.ready().await;

        let err = h
            .provider
            .sign_up("a@b.com", "another-pass", SignUpMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyRegistered));
    }

    #[tokio::test]
    async fn test_logout_clears_even_when_remote_fails() {
        let backend = InMemoryBackend::new();
        backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();
        backend.set_fail_sign_out(true);

        let h = Harness::start(backend);
        assert!(h.provider.ready().await.is_admin());

        h.provider.logout().await;

        let state = h.provider.state();
        assert!(state.user().is_none());
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
        assert_eq!(h.nav.history(), vec!["/login"]);
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_logout_after_sign_in() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Customer));

        let h = Harness::start(backend);
        h.provider.ready().await;
        h.provider.sign_in("a@b.com", "right-pass").await.unwrap();
        h.provider.logout().await;

        assert!(!h.provider.state().is_authenticated());
        assert!(h.backend.current_session().is_none());
        assert_eq!(h.nav.history(), vec!["/dashboard", "/login"]);
    }

    #[tokio::test]
    async fn test_refresh_profile_rederives_admin() {
        let backend = InMemoryBackend::new();
        let user = backend.add_account("a@b.com", "right-pass", Some(UserRole::Admin));
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        assert!(h.provider.ready().await.is_admin());

        h.backend.set_role(&user.id, Some(UserRole::Customer));
        h.provider.refresh_profile().await;

        let state = h.provider.state();
        assert!(!state.is_admin());
        assert!(!state.is_loading());
        h.assert_consistent_history();
    }

    #[tokio::test]
    async fn test_refresh_profile_failure_drops_stale_profile() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Admin));
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        assert!(h.provider.ready().await.is_admin());

        h.backend.set_fail_profiles(true);
        h.provider.refresh_profile().await;

        let state = h.provider.state();
        assert!(state.is_authenticated());
        assert!(state.profile().is_none());
        assert!(!state.is_admin());
    }

    #[tokio::test]
    async fn test_refresh_profile_shows_loading() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", None);
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        h.provider.ready().await;
        h.backend.set_profile_latency(Duration::from_millis(30));

        let provider = h.provider.clone();
        let refresh = tokio::spawn(async move { provider.refresh_profile().await });
        let during = h.provider.wait_for(|s| s.is_loading()).await;
        assert!(during.is_authenticated());

        refresh.await.unwrap();
        assert!(!h.provider.state().is_loading());
    }

    #[tokio::test]
    async fn test_refresh_profile_signed_out_is_noop() {
        let h = Harness::start(InMemoryBackend::new());
        let before = h.provider.ready().await;

        h.provider.refresh_profile().await;
        assert_eq!(h.provider.state(), before);
        assert_eq!(h.backend.profile_fetches(), 0);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Customer));
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        h.provider.ready().await;

        let saved = h
            .provider
            .update_profile(
                ProfileUpdate::default()
                    .full_name("  Ada Lovelace ")
                    .company_name("Groop"),
            )
            .await
            .unwrap();
        assert_eq!(saved.full_name.as_deref(), Some("Ada Lovelace"));

        let state = h.provider.state();
        let profile = state.profile().unwrap();
        assert_eq!(profile.company_name.as_deref(), Some("Groop"));
        assert_eq!(profile.role, Some(UserRole::Customer));
    }

    #[tokio::test]
    async fn test_update_profile_requires_user() {
        let h = Harness::start(InMemoryBackend::new());
        h.provider.ready().await;

        let err = h
            .provider
            .update_profile(ProfileUpdate::default().full_name("Ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
    }

    #[tokio::test]
    async fn test_update_password() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", None);

        let h = Harness::start(backend);
        h.provider.ready().await;

        let err = h.provider.update_password("short").await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));

        h.provider.sign_in("a@b.com", "right-pass").await.unwrap();
        let err = h.provider.update_password("short").await.unwrap_err();
        assert!(matches!(err, AuthError::PasswordValidation(_)));

        h.provider.update_password("brand-new-pass").await.unwrap();
        h.provider.logout().await;

        assert!(h.provider.sign_in("a@b.com", "right-pass").await.is_err());
        assert!(h.provider.sign_in("a@b.com", "brand-new-pass").await.is_ok());
    }
}

#[cfg(test)]
mod guard_tests {
    use std::time::Duration;

    use super::support::*;
    use crate::application::config::AuthConfig;
    use crate::domain::value_object::user_role::UserRole;
    use crate::infra::memory::InMemoryBackend;
    use crate::presentation::guard::GuardDecision;
    use crate::presentation::navigation::RecordingNavigator;
    use crate::presentation::routes::RouteTable;

    #[tokio::test]
    async fn test_admin_route_redirects_customer_once() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Customer));
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        h.provider.ready().await;

        let table = RouteTable::groop();
        let nav = RecordingNavigator::new();
        let mut route = table.mount("/dashboard/admin", h.provider.config());

        for _ in 0..3 {
            assert_eq!(
                route.update(&h.provider.state(), &nav),
                GuardDecision::Redirect("/dashboard".into())
            );
        }
        assert_eq!(nav.history(), vec!["/dashboard"]);
    }

    #[tokio::test]
    async fn test_no_redirect_while_loading() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", Some(UserRole::Customer));
        backend.persist_session_for("a@b.com").unwrap();
        backend.set_profile_latency(Duration::from_millis(50));

        let h = Harness::start(backend);
        let table = RouteTable::groop();
        let nav = RecordingNavigator::new();
        let mut route = table.mount("/dashboard/admin", h.provider.config());

        let loading = h
            .provider
            .wait_for(|s| s.is_loading() && s.is_authenticated())
            .await;
        assert_eq!(route.update(&loading, &nav), GuardDecision::Loading);
        assert!(nav.is_empty());

        let settled = h.provider.ready().await;
        route.update(&settled, &nav);
        assert_eq!(nav.history(), vec!["/dashboard"]);
    }

    #[tokio::test]
    async fn test_admin_redirect_toggle() {
        let backend = InMemoryBackend::new();
        backend.add_account("admin@groop.example", "pass-admin", Some(UserRole::Admin));
        backend.persist_session_for("admin@groop.example").unwrap();

        let config = AuthConfig::default().with_admin_redirect(true);
        let h = Harness::start_with(backend, config);
        let state = h.provider.ready().await;

        let table = RouteTable::groop();
        let nav = RecordingNavigator::new();
        let mut dashboard = table.mount("/dashboard", h.provider.config());
        assert_eq!(
            dashboard.update(&state, &nav),
            GuardDecision::Redirect("/dashboard/admin".into())
        );

        let mut admin = table.mount("/dashboard/admin", h.provider.config());
        assert_eq!(admin.update(&state, &nav), GuardDecision::Render);
        assert_eq!(nav.history(), vec!["/dashboard/admin"]);
    }

    #[tokio::test]
    async fn test_logout_redirects_guarded_route_once() {
        let backend = InMemoryBackend::new();
        backend.add_account("a@b.com", "right-pass", None);
        backend.persist_session_for("a@b.com").unwrap();

        let h = Harness::start(backend);
        let table = RouteTable::groop();
        let nav = RecordingNavigator::new();
        let mut route = table.mount("/dashboard/shipments", h.provider.config());

        assert_eq!(route.update(&h.provider.ready().await, &nav), GuardDecision::Render);

        h.provider.logout().await;
        for _ in 0..3 {
            route.update(&h.provider.state(), &nav);
        }
        assert_eq!(nav.history(), vec!["/login"]);
    }
}
