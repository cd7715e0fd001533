//! Key-Value Module
//!
//! Backends speaking the handful of Redis commands the probe needs, and the
//! namespaced repository built on top of them.

mod memory;
mod redis;
mod repository;


use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

// Re-export public types
pub use self::memory::MemoryKv;
pub use self::redis::RedisBackend;
pub use repository::{namespaced_key, KvRepository};

// == Public Constants ==
/// Prefix carried by every key this service reads or writes
pub const KEY_NAMESPACE: &str = "test:";

/// SCAN pattern matching the namespace
pub const SCAN_PATTERN: &str = "test:*";

/// Number of slots requested per SCAN call
pub const SCAN_BATCH: usize = 100;

/// TTL reply for a key without expiration
pub const TTL_NO_EXPIRY: i64 = -1;

/// TTL reply for a key that does not exist
pub const TTL_MISSING: i64 = -2;

/// Lines of INFO output kept in diagnostics
pub const INFO_LINES: usize = 20;

// == Entry ==
/// One enumerated key with its value and remaining TTL.
///
/// `value` is `None` and `ttl` is [`TTL_MISSING`] when the key disappeared
/// between discovery and read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KvEntry {
    pub key: String,
    pub value: Option<String>,
    pub ttl: i64,
}

// == Backend Trait ==
/// Primitive key-value commands, one store round trip each.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// One SCAN step. Returns the next cursor (0 when exhausted) and the batch.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)>;

    /// GET; `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// TTL in seconds, or [`TTL_NO_EXPIRY`] / [`TTL_MISSING`].
    async fn ttl(&self, key: &str) -> Result<i64>;

    /// SET without expiration; clears any previous TTL on the key.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// SETEX with expiration in seconds.
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<()>;

    /// DEL; returns the number of keys removed.
    async fn del(&self, key: &str) -> Result<u64>;

    /// PING; the server's reply, normally `PONG`.
    async fn ping(&self) -> Result<String>;

    /// DBSIZE across every namespace.
    async fn dbsize(&self) -> Result<u64>;

    /// Full INFO text, unparsed.
    async fn info(&self) -> Result<String>;
}
