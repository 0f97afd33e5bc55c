//! Groop Console Entry Point
//!
//! Drives the auth state machine and the route guards from a terminal.
//! Uses `anyhow` for startup errors; operation errors are rendered through
//! `kernel::error::AppError`.
//!
//! ```text
//! groop [--offline] [--admin-redirect]
//! ```
//!
//! `--offline` runs against an in-memory backend seeded with demo accounts;
//! otherwise the hosted backend is read from `GROOP_BACKEND_URL` and
//! `GROOP_BACKEND_ANON_KEY`.

mod navigator;
mod repl;

use std::sync::Arc;

use auth::domain::repository::{ProfileRepository, SessionStore};
use auth::domain::value_object::user_role::UserRole;
use auth::{AuthConfig, AuthProvider, HostedBackend, InMemoryBackend};
use platform::config::BackendConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::navigator::ConsoleNavigator;
use crate::repl::Shell;

const DEMO_ACCOUNTS: [(&str, &str, UserRole); 2] = [
    ("admin@groop.example", "admin123", UserRole::Admin),
    ("customer@groop.example", "customer123", UserRole::Customer),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so they do not interleave with command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groop=info,auth=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let offline = args.iter().any(|a| a == "--offline");

    let mut config = AuthConfig::default();
    if args.iter().any(|a| a == "--admin-redirect") {
        config = config.with_admin_redirect(true);
    }

    if offline {
        let backend = Arc::new(InMemoryBackend::new());
        for (email, password, role) in DEMO_ACCOUNTS {
            backend.add_account(email, password, Some(role));
        }
        tracing::info!(accounts = DEMO_ACCOUNTS.len(), "Using in-memory backend");
        println!("offline mode; demo accounts:");
        for (email, password, role) in &DEMO_ACCOUNTS {
            println!("  {} / {} ({})", email, password, role.code());
        }
        run(Arc::clone(&backend), backend, config).await
    } else {
        let backend_config = BackendConfig::from_env()?;
        tracing::info!(url = %backend_config.url, "Using hosted backend");
        let backend = Arc::new(HostedBackend::new(&backend_config)?);
        run(Arc::clone(&backend), backend, config).await
    }
}

async fn run<S, P>(store: Arc<S>, profiles: Arc<P>, config: AuthConfig) -> anyhow::Result<()>
where
    S: SessionStore + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    let navigator = Arc::new(ConsoleNavigator::new("/"));
    let provider = AuthProvider::start(store, profiles, config, navigator.clone());

    Shell::new(provider, navigator).run().await
}
