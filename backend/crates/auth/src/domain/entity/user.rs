//! User Entity
//!
//! The identity provider's account record. Application data lives on the
//! [`Profile`](super::profile::Profile) joined by the same id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::value_object::{email::Email, user_id::UserId};

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identity provider id, shared with the profile row
    pub id: UserId,
    /// Login email; absent for phone-only accounts
    #[serde(default)]
    pub email: Option<Email>,
    /// Account creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Metadata supplied at sign-up
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl User {
    pub fn new(id: UserId, email: Email) -> Self {
        Self {
            id,
            email: Some(email),
            created_at: Some(Utc::now()),
            user_metadata: Map::new(),
        }
    }

    pub fn email_str(&self) -> &str {
        self.email.as_ref().map(Email::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_backend_user() {
        let json = serde_json::json!({
            "id": "4f1c3b0e-8a7d-4e53-9b1e-6f2d1c9a0b11",
            "aud": "authenticated",
            "email": "ops@groop.example",
            "created_at": "2024-03-01T10:00:00Z",
            "user_metadata": { "full_name": "Ops" }
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.email_str(), "ops@groop.example");
        assert_eq!(user.user_metadata["full_name"], "Ops");
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_decode_minimal_user() {
        let json = serde_json::json!({ "id": "4f1c3b0e-8a7d-4e53-9b1e-6f2d1c9a0b11" });
        let user: User = serde_json::from_value(json).unwrap();
        assert!(user.email.is_none());
        assert_eq!(user.email_str(), "");
    }
}
