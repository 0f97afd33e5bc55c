//! Profile Entity
//!
//! Application-level user record keyed by the user id. Only `role` matters to
//! authorization; the rest is display data for the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Same as the owning user's id
    pub id: UserId,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Denormalized copy of the login email
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub account_balance: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Empty profile with the given role, as the sign-up trigger creates it
    pub fn new(id: UserId, role: Option<UserRole>) -> Self {
        Self {
            id,
            full_name: None,
            company_name: None,
            email: None,
            phone_number: None,
            role,
            account_balance: Some(0.0),
            created_at: Some(Utc::now()),
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(UserRole::is_admin)
    }

    /// Apply the fields present in `update`
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(v) = &update.full_name {
            self.full_name = Some(v.clone());
        }
        if let Some(v) = &update.company_name {
            self.company_name = Some(v.clone());
        }
        if let Some(v) = &update.phone_number {
            self.phone_number = Some(v.clone());
        }
    }
}

/// Partial profile write from the settings form
///
/// Role and balance are not user-editable and have no field here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    pub fn full_name(mut self, value: impl Into<String>) -> Self {
        self.full_name = Some(value.into());
        self
    }

    pub fn company_name(mut self, value: impl Into<String>) -> Self {
        self.company_name = Some(value.into());
        self
    }

    pub fn phone_number(mut self, value: impl Into<String>) -> Self {
        self.phone_number = Some(value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.company_name.is_none() && self.phone_number.is_none()
    }
}
