//! Key-Value Repository
//!
//! Namespaced get/set/delete/enumerate over any [`KvBackend`].

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use super::{KvBackend, KvEntry, KEY_NAMESPACE, SCAN_BATCH, SCAN_PATTERN};
use crate::error::{AppError, Result};

/// Adds the namespace prefix unless the key already carries it.
pub fn namespaced_key(key: &str) -> String {
    if key.starts_with(KEY_NAMESPACE) {
        key.to_string()
    } else {
        format!("{}{}", KEY_NAMESPACE, key)
    }
}

/// Repository over the `test:` keyspace of a key-value backend.
#[derive(Clone)]
pub struct KvRepository {
    backend: Arc<dyn KvBackend>,
}

impl KvRepository {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// The underlying backend, for diagnostics.
    pub fn backend(&self) -> &dyn KvBackend {
        self.backend.as_ref()
    }

    // == Enumerate ==
    /// Lists every namespaced key with its value and TTL.
    ///
    /// Keys are discovered with sequential SCAN calls until the cursor returns
    /// to 0, then resolved concurrently. A key that vanishes before it is read
    /// still appears, with `value: None` and `ttl: TTL_MISSING`. Any backend
    /// error fails the whole listing.
    pub async fn list(&self) -> Result<Vec<KvEntry>> {
        let keys = self.scan_keys().await?;
        debug!("Resolving {} keys", keys.len());

        let backend = &self.backend;
        let entries = try_join_all(keys.into_iter().map(|key| async move {
            let value = backend.get(&key).await?;
            let ttl = backend.ttl(&key).await?;
            Ok::<_, AppError>(KvEntry { key, value, ttl })
        }))
        .await?;

        Ok(entries)
    }

    async fn scan_keys(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        let mut cursor = 0;

        loop {
            let (next, batch) = self.backend.scan(cursor, SCAN_PATTERN, SCAN_BATCH).await?;

            // SCAN may repeat a key across batches
            for key in batch {
                if key.starts_with(KEY_NAMESPACE) && seen.insert(key.clone()) {
                    keys.push(key);
                }
            }

            if next == 0 {
                return Ok(keys);
            }
            cursor = next;
        }
    }

    // == Set ==
    /// Stores a value under the namespaced key and reads it back.
    ///
    /// A positive `ttl` sets an expiration in seconds; anything else stores the
    /// value without one, clearing any TTL the key had before.
    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<i64>,
    ) -> Result<(String, Option<String>)> {
        let key = key.trim();
        if key.is_empty() || value.is_empty() {
            return Err(AppError::InvalidRequest(
                "Key and value are required".to_string(),
            ));
        }

        let full_key = namespaced_key(key);
        match ttl {
            Some(seconds) if seconds > 0 => {
                self.backend.set_ex(&full_key, value, seconds as u64).await?;
                info!("Set {} with TTL {}s", full_key, seconds);
            }
            _ => {
                self.backend.set(&full_key, value).await?;
                info!("Set {} without TTL", full_key);
            }
        }

        let stored = self.backend.get(&full_key).await?;
        Ok((full_key, stored))
    }

    // == Get ==
    /// Reads one namespaced key; `None` when absent.
    pub async fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        let full_key = namespaced_key(key.trim());
        let Some(value) = self.backend.get(&full_key).await? else {
            return Ok(None);
        };
        let ttl = self.backend.ttl(&full_key).await?;

        Ok(Some(KvEntry {
            key: full_key,
            value: Some(value),
            ttl,
        }))
    }

    // == Delete ==
    /// Deletes the namespaced key. A missing key is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidRequest("Key is required".to_string()));
        }

        let full_key = namespaced_key(key);
        let removed = self.backend.del(&full_key).await?;
        debug!("Deleted {} ({} removed)", full_key, removed);
        Ok(())
    }
}
