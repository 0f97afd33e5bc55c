//! Console navigation
//!
//! Keeps the "current route" of the shell and prints every move.

use std::sync::Mutex;

use auth::presentation::navigation::Navigator;

#[derive(Debug)]
pub struct ConsoleNavigator {
    current: Mutex<String>,
}

impl ConsoleNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
        }
    }

    pub fn current(&self) -> String {
        match self.current.lock() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        println!("  -> {}", path);
        tracing::debug!(path = %path, "Navigate");
        match self.current.lock() {
            Ok(mut current) => *current = path.to_string(),
            Err(poisoned) => *poisoned.into_inner() = path.to_string(),
        }
    }
}
