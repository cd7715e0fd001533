//! Request DTOs for the probe API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::db::NewItem;

/// Request body for POST /items
///
/// Missing fields deserialize to `None` so validation, not the JSON
/// extractor, decides what is acceptable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CreateItemRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.name.as_deref().map(str::trim) {
            None | Some("") => Some("Name is required".to_string()),
            Some(_) => None,
        }
    }

    pub fn into_new_item(self) -> NewItem {
        NewItem {
            name: self.name.unwrap_or_default(),
            description: self.description,
        }
    }
}

/// Request body for POST /redis
///
/// # Fields
/// - `key`: Key with or without the `test:` prefix
/// - `value`: The value to store
/// - `ttl`: Optional TTL in seconds; absent or non-positive means no expiration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetKeyRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub ttl: Option<i64>,
}
