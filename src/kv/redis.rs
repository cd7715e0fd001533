//! Redis backend
//!
//! Owns a single multiplexed connection, opened on first use and reused for
//! the life of the process.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::KvBackend;
use crate::error::Result;

/// Redis-backed [`KvBackend`].
pub struct RedisBackend {
    client: Client,
    /// Lazily established session; at most one per backend
    manager: OnceCell<ConnectionManager>,
}

impl RedisBackend {
    /// Parses the URL without connecting. The connection is made by the first command.
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            manager: OnceCell::new(),
        })
    }

    /// Returns true once a session has been established.
    pub fn is_connected(&self) -> bool {
        self.manager.initialized()
    }

    // == Connect or reuse ==
    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .manager
            .get_or_try_init(|| async {
                info!("Opening Redis connection");
                ConnectionManager::new(self.client.clone()).await
            })
            .await?;

        // ConnectionManager is a cheap handle onto the shared multiplexed session
        Ok(manager.clone())
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<(u64, Vec<String>)> {
        let mut conn = self.connection().await?;
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut conn)
            .await?;

        debug!(cursor, next, found = keys.len(), "SCAN step");
        Ok((next, keys))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        Ok(conn.get(key).await?)
    }

    async fn ttl(&self, key: &str) -> Result<i64> {
        let mut conn = self.connection().await?;
        Ok(conn.ttl(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value, seconds).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<u64> {
        let mut conn = self.connection().await?;
        Ok(conn.del(key).await?)
    }

    async fn ping(&self) -> Result<String> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("PING").query_async(&mut conn).await?)
    }

    async fn dbsize(&self) -> Result<u64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("DBSIZE").query_async(&mut conn).await?)
    }

    async fn info(&self) -> Result<String> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("INFO").query_async(&mut conn).await?)
    }
}
