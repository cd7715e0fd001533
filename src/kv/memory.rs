//! In-memory backend
//!
//! Redis-compatible semantics for the commands in [`KvBackend`]: lazy TTL
//! expiration, `-1`/`-2` TTL sentinels, and a cursored SCAN that never skips a
//! key which stays present for the whole iteration.

use std::collections::{BTreeMap, HashMap};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use tokio::sync::RwLock;

use super::{KvBackend, TTL_MISSING, TTL_NO_EXPIRY};
use crate::error::{AppError, Result};

// == Entry ==
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
    /// Position in scan order, fixed for the key's lifetime
    slot: u64,
}

impl Entry {
    /// Boundary condition: expired once now >= expires_at.
    fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }

    /// Remaining seconds rounded up, so a live key never reports 0.
    fn ttl_seconds(&self, now: u64) -> i64 {
        match self.expires_at {
            None => TTL_NO_EXPIRY,
            Some(expires) if expires > now => ((expires - now + 999) / 1000) as i64,
            Some(_) => TTL_MISSING,
        }
    }
}

// == Keyspace ==
#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, Entry>,
    /// slot -> key, iterated by SCAN
    order: BTreeMap<u64, String>,
    /// Slot 0 is never handed out so cursor 0 can mean "start"/"done"
    next_slot: u64,
}

impl Keyspace {
    fn live(&self, key: &str, now: u64) -> Option<&Entry> {
        self.entries.get(key).filter(|entry| !entry.is_expired(now))
    }

    fn insert(&mut self, key: &str, value: &str, expires_at: Option<u64>) {
        if let Some(entry) = self.entries.get_mut(key) {
            // Overwrite keeps the slot so an in-flight scan still sees it once
            entry.value = value.to_string();
            entry.expires_at = expires_at;
            return;
        }

        self.next_slot += 1;
        let slot = self.next_slot;
        self.order.insert(slot, key.to_string());
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
                slot,
            },
        );
    }

    fn remove(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.slot);
        Some(entry)
    }

    fn purge_expired(&mut self, now: u64) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in expired {
            self.remove(&key);
        }
    }
}

// == Memory Backend ==
/// Process-local [`KvBackend`] used by the test suites.
#[derive(Debug, Default)]
pub struct MemoryKv {
    keyspace: RwLock<Keyspace>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys, namespaced or not.
    pub async fn len(&self) -> usize {
        let now = now_ms();
        let keyspace = self.keyspace.read().await;
        keyspace
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl KvBackend for MemoryKv {
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let matcher = scan_matcher(pattern)?;
        let now = now_ms();
        let keyspace = self.keyspace.read().await;

        // COUNT bounds the slots examined, not the keys returned, as in Redis
        let mut keys = Vec::new();
        let mut last_slot = cursor;

        for (slot, key) in keyspace.order.range(cursor..).take(count.max(1)) {
            last_slot = *slot;
            if keyspace.live(key, now).is_some() && matcher.is_match(key) {
                keys.push(key.clone());
            }
        }

        let more = keyspace.order.range(last_slot + 1..).next().is_some();
        let next = if more { last_slot + 1 } else { 0 };
        Ok((next, keys))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = now_ms();
        let keyspace = self.keyspace.read().await;
        Ok(keyspace.live(key, now).map(|entry| entry.value.clone()))
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let now = now_ms();
        let keyspace = self.keyspace.read().await;
        Ok(keyspace
            .live(key, now)
            .map_or(TTL_MISSING, |entry| entry.ttl_seconds(now)))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.purge_expired(now_ms());
        keyspace.insert(key, value, None);
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<()> {
        let now = now_ms();
        let mut keyspace = self.keyspace.write().await;
        keyspace.purge_expired(now);
        keyspace.insert(key, value, Some(now.saturating_add(seconds.saturating_mul(1000))));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64> {
        let now = now_ms();
        let mut keyspace = self.keyspace.write().await;
        let removed = keyspace.remove(key);
        Ok(removed.is_some_and(|entry| !entry.is_expired(now)) as u64)
    }

    async fn ping(&self) -> Result<String> {
        Ok("PONG".to_string())
    }

    async fn dbsize(&self) -> Result<u64> {
        Ok(self.len().await as u64)
    }

    async fn info(&self) -> Result<String> {
        let now = now_ms();
        let keyspace = self.keyspace.read().await;
        let live: Vec<&Entry> = keyspace
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .collect();
        let expiring = live.iter().filter(|entry| entry.expires_at.is_some()).count();

        Ok(format!(
            "# Server\r\nredis_version:memory\r\nredis_mode:standalone\r\n\r\n# Keyspace\r\ndb0:keys={},expires={},avg_ttl=0\r\n",
            live.len(),
            expiring
        ))
    }
}

// == Helpers ==
fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Compiles a SCAN MATCH pattern; `*` and `?` span any character, `:` included.
fn scan_matcher(pattern: &str) -> Result<GlobMatcher> {
    let glob = Glob::new(pattern)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid scan pattern: {}", e)))?;
    Ok(glob.compile_matcher())
}
