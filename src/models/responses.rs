//! Response DTOs for the probe API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::db::{DatabaseSummary, Item};
use crate::kv::KvEntry;

/// Response body for GET /items
#[derive(Debug, Clone, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<Item>,
}

/// Response body for POST /items
#[derive(Debug, Clone, Serialize)]
pub struct ItemResponse {
    pub item: Item,
}

/// Response body for DELETE /items/:id
#[derive(Debug, Clone, Serialize)]
pub struct DeletedItemResponse {
    pub success: bool,
    pub deleted: Item,
}

impl DeletedItemResponse {
    pub fn new(deleted: Item) -> Self {
        Self {
            success: true,
            deleted,
        }
    }
}

/// Response body for GET /redis
#[derive(Debug, Clone, Serialize)]
pub struct KvListResponse {
    pub items: Vec<KvEntry>,
}

/// Response body for POST /redis
///
/// `value` is what the store returned when re-read after the write.
#[derive(Debug, Clone, Serialize)]
pub struct KvSetResponse {
    pub success: bool,
    pub key: String,
    pub value: Option<String>,
}

impl KvSetResponse {
    pub fn new(key: String, value: Option<String>) -> Self {
        Self {
            success: true,
            key,
            value,
        }
    }
}

/// Bare success acknowledgement (DELETE /redis/:key)
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Response body for GET /db-info
#[derive(Debug, Clone, Serialize)]
pub struct DbInfoResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
    #[serde(rename = "databaseSize", skip_serializing_if = "Option::is_none")]
    pub database_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DbInfoResponse {
    pub fn connected(summary: DatabaseSummary) -> Self {
        Self {
            connected: true,
            version: Some(summary.version),
            tables: Some(summary.tables),
            database_size: Some(summary.database_size),
            error: None,
        }
    }

    pub fn disconnected(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            version: None,
            tables: None,
            database_size: None,
            error: Some(error.into()),
        }
    }
}

/// Response body for GET /redis-info
#[derive(Debug, Clone, Serialize)]
pub struct RedisInfoResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping: Option<String>,
    #[serde(rename = "dbSize", skip_serializing_if = "Option::is_none")]
    pub db_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RedisInfoResponse {
    pub fn connected(ping: String, db_size: u64, info: String) -> Self {
        Self {
            connected: true,
            ping: Some(ping),
            db_size: Some(db_size),
            info: Some(info),
            error: None,
        }
    }

    pub fn disconnected(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            ping: None,
            db_size: None,
            info: None,
            error: Some(error.into()),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
