//! Sign-up metadata forwarded to the identity provider
//!
//! The profile row is provisioned from these fields by the backend. Unknown
//! fields are accepted and forwarded as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignUpMetadata {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignUpMetadata {
    pub fn new(
        full_name: impl Into<String>,
        company_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into().trim().to_string(),
            company_name: company_name.into().trim().to_string(),
            phone_number: phone_number.into().trim().to_string(),
            extra: Map::new(),
        }
    }

    /// Attach an additional field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
