use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Role stored on the profile row
///
/// The column is free text; anything other than the two known codes is kept
/// verbatim as [`UserRole::Other`] and carries no privileges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum UserRole {
    Admin,
    #[default]
    Customer,
    Other(String),
}

impl UserRole {
    #[inline]
    pub fn code(&self) -> &str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
            UserRole::Other(code) => code,
        }
    }

    /// Exact, case-sensitive match on `"admin"`
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "admin" => UserRole::Admin,
            "customer" => UserRole::Customer,
            other => {
                tracing::debug!(role = %other, "Unrecognized profile role");
                UserRole::Other(other.to_string())
            }
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(UserRole::from_code(&code))
    }
}
