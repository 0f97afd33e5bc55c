//! Interactive shell
//!
//! Reads one command per line, runs it against the auth provider and then
//! settles the current route: the route's guard is evaluated and redirects
//! are followed until a route renders or waits for the auth state.

use std::sync::Arc;

use auth::application::provider::AuthProvider;
use auth::domain::entity::profile::ProfileUpdate;
use auth::domain::repository::{ProfileRepository, SessionStore};
use auth::domain::value_object::sign_up_metadata::SignUpMetadata;
use auth::error::AuthError;
use auth::presentation::dto::AuthStateView;
use auth::presentation::guard::{GuardDecision, GuardedRoute};
use auth::presentation::navigation::Navigator;
use auth::presentation::routes::RouteTable;
use kernel::error::app_error::AppError;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::navigator::ConsoleNavigator;

/// Guards followed in a row before giving up on a redirect chain
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { email: String, password: String },
    SignUp {
        email: String,
        password: String,
        full_name: String,
    },
    Logout,
    WhoAmI,
    Refresh,
    Open(String),
    Profile(ProfileUpdate),
    Passwd(String),
    Routes,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match (verb, rest.as_slice()) {
            ("login", [email, password]) => Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            },
            ("login", _) => return Err("usage: login <email> <password>".into()),
            ("signup", [email, password, name @ ..]) => Command::SignUp {
                email: email.to_string(),
                password: password.to_string(),
                full_name: name.join(" "),
            },
            ("signup", _) => return Err("usage: signup <email> <password> [full name]".into()),
            ("logout", []) => Command::Logout,
            ("whoami", []) => Command::WhoAmI,
            ("refresh", []) => Command::Refresh,
            ("open", [path]) => Command::Open(path.to_string()),
            ("open", _) => return Err("usage: open <path>".into()),
            ("profile", [field, value @ ..]) if !value.is_empty() => {
                let value = value.join(" ");
                let update = ProfileUpdate::default();
                Command::Profile(match *field {
                    "name" => update.full_name(value),
                    "company" => update.company_name(value),
                    "phone" => update.phone_number(value),
                    other => return Err(format!("unknown profile field: {}", other)),
                })
            }
            ("profile", _) => return Err("usage: profile <name|company|phone> <value>".into()),
            ("passwd", [password]) => Command::Passwd(password.to_string()),
            ("passwd", _) => return Err("usage: passwd <new password>".into()),
            ("routes", []) => Command::Routes,
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            (other, _) => return Err(format!("unknown command: {} (try `help`)", other)),
        };
        Ok(Some(command))
    }
}

const HELP: &str = "\
commands:
  login <email> <password>           sign in
  signup <email> <password> [name]   create an account
  logout                             sign out
  whoami                             print the auth state
  refresh                            re-fetch the profile
  open <path>                        navigate to a route
  profile <name|company|phone> <v>   update a profile field
  passwd <new password>              change the password
  routes                             list application routes
  quit                               leave";

pub struct Shell<S, P>
where
    S: SessionStore,
    P: ProfileRepository,
{
    provider: AuthProvider<S, P>,
    navigator: Arc<ConsoleNavigator>,
    table: RouteTable,
    mounted: Option<GuardedRoute>,
}

impl<S, P> Shell<S, P>
where
    S: SessionStore + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    pub fn new(provider: AuthProvider<S, P>, navigator: Arc<ConsoleNavigator>) -> Self {
        Self {
            provider,
            navigator,
            table: RouteTable::groop(),
            mounted: None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        self.provider.ready().await;
        self.settle();
        println!("type `help` for commands");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => {
                    self.execute(command).await;
                    self.settle();
                }
                Err(usage) => println!("{}", usage),
            }
        }

        self.provider.shutdown().await;
        Ok(())
    }

    async fn execute(&mut self, command: Command) {
        match command {
            Command::Login { email, password } => {
                match self.provider.sign_in(email, password).await {
                    Ok(session) => println!("signed in as {}", session.user.email_str()),
                    Err(e) => report(e),
                }
            }
            Command::SignUp {
                email,
                password,
                full_name,
            } => {
                let metadata = SignUpMetadata::new(full_name, "", "");
                match self.provider.sign_up(email, password, metadata).await {
                    Ok(result) if result.confirmation_pending() => {
                        println!("account created; check your inbox to confirm it")
                    }
                    Ok(result) => println!("account created for {}", result.user.email_str()),
                    Err(e) => report(e),
                }
            }
            Command::Logout => {
                self.provider.logout().await;
                println!("signed out");
            }
            Command::WhoAmI => {
                let view = AuthStateView::from(&self.provider.state());
                match serde_json::to_string_pretty(&view) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!(error = %e, "Failed to render state"),
                }
            }
            Command::Refresh => {
                self.provider.refresh_profile().await;
                println!("profile refreshed");
            }
            Command::Open(path) => self.navigator.navigate(&path),
            Command::Profile(update) => match self.provider.update_profile(update).await {
                Ok(_) => println!("profile saved"),
                Err(e) => report(e),
            },
            Command::Passwd(password) => match self.provider.update_password(password).await {
                Ok(_) => println!("password changed"),
                Err(e) => report(e),
            },
            Command::Routes => {
                for route in self.table.routes() {
                    let access = match (route.options.require_auth, route.options.require_admin) {
                        (_, true) => "admin",
                        (true, false) => "user",
                        (false, false) => "public",
                    };
                    println!("  {:<28} {:<7} {}", route.pattern, access, route.name);
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    /// Mount the navigator's current route and follow guard redirects
    fn settle(&mut self) {
        for _ in 0..MAX_REDIRECTS {
            let current = self.navigator.current();
            let resolved_path = self.table.resolve(&current).path;

            let remount = self
                .mounted
                .as_ref()
                .is_none_or(|route| route.path() != resolved_path);
            if remount {
                self.mounted = Some(self.table.mount(&current, self.provider.config()));
            }
            let Some(route) = self.mounted.as_mut() else {
                return;
            };

            let state = self.provider.state();
            match route.update(&state, self.navigator.as_ref()) {
                GuardDecision::Render => {
                    let resolved = self.table.resolve(&current);
                    println!("[{}] {}", resolved.route.name, resolved.path);
                    return;
                }
                GuardDecision::Loading => {
                    println!("[loading] {}", resolved_path);
                    return;
                }
                // Already redirected from here once; nothing new to follow
                GuardDecision::Redirect(_) if self.navigator.current() == current => return,
                GuardDecision::Redirect(_) => {}
            }
        }
        tracing::warn!(path = %self.navigator.current(), "Redirect limit reached");
    }
}

fn report(err: AuthError) {
    let app: AppError = err.into();
    let view = app.to_view();
    match view.action {
        Some(action) => println!("error: {} ({})", view.message, action),
        None => println!("error: {}", view.message),
    }
}
