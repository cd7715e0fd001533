//! Diagnostics Reporter
//!
//! Introspects each backing store and reports the result verbatim. These
//! functions never fail: a store error becomes `connected: false`.

use tracing::warn;

use crate::db::ItemStore;
use crate::error::Result;
use crate::kv::{KvBackend, INFO_LINES};
use crate::models::{DbInfoResponse, RedisInfoResponse};

/// Version, table list and size of the relational store.
pub async fn database_report(store: &dyn ItemStore) -> DbInfoResponse {
    match store.summary().await {
        Ok(summary) => DbInfoResponse::connected(summary),
        Err(e) => {
            warn!("Database diagnostics failed: {}", e);
            DbInfoResponse::disconnected(e.to_string())
        }
    }
}

/// PING, DBSIZE and the head of INFO from the key-value store.
pub async fn redis_report(backend: &dyn KvBackend) -> RedisInfoResponse {
    match probe_redis(backend).await {
        Ok(report) => report,
        Err(e) => {
            warn!("Redis diagnostics failed: {}", e);
            RedisInfoResponse::disconnected(e.to_string())
        }
    }
}

async fn probe_redis(backend: &dyn KvBackend) -> Result<RedisInfoResponse> {
    let info = backend.info().await?;
    let ping = backend.ping().await?;
    let db_size = backend.dbsize().await?;

    Ok(RedisInfoResponse::connected(
        ping,
        db_size,
        head_lines(&info, INFO_LINES),
    ))
}

fn head_lines(text: &str, count: usize) -> String {
    text.split('\n').take(count).collect::<Vec<_>>().join("\n")
}
