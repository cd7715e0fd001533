//! Postgres item store
//!
//! Pooled sessions via sqlx. The pool connects lazily so the server starts,
//! and diagnostics can report the failure, even while the database is down.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions, Postgres};
use sqlx::Connection;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{DatabaseSummary, Item, ItemStore, NewItem};
use crate::config::Config;
use crate::error::{AppError, Result};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS test_items (
        id SERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Postgres-backed [`ItemStore`].
pub struct PgItemStore {
    pool: PgPool,
    /// Set once the table is known to exist
    schema: OnceCell<()>,
}

impl PgItemStore {
    /// Builds the pool from configuration without opening a connection.
    pub fn from_config(config: &Config) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(config.pg_max_connections)
            .acquire_timeout(config.pg_acquire_timeout())
            .connect_lazy_with(config.pg_connect_options());
        Self::new(pool)
    }

    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    /// Handle to the pool, used to close it on shutdown.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Checks out a pooled connection.
    ///
    /// The pool retries failed connects until its acquire timeout and then
    /// reports only `PoolTimedOut`. In that case a single direct connect is
    /// made so the caller sees the server's own error.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>> {
        match self.pool.acquire().await {
            Ok(conn) => Ok(conn),
            Err(sqlx::Error::PoolTimedOut) => Err(self.connect_failure().await),
            Err(e) => Err(e.into()),
        }
    }

    async fn connect_failure(&self) -> AppError {
        let options = self.pool.connect_options();
        match PgConnection::connect_with(&options).await {
            Err(e) => {
                warn!("Postgres connect failed: {}", e);
                e.into()
            }
            // Reachable again, so the timeout came from an exhausted pool
            Ok(conn) => {
                if let Err(e) = conn.close().await {
                    warn!("Closing direct Postgres connection failed: {}", e);
                }
                sqlx::Error::PoolTimedOut.into()
            }
        }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn bootstrap(&self) -> Result<()> {
        self.schema
            .get_or_try_init(|| async {
                let mut conn = self.acquire().await?;
                sqlx::query(CREATE_TABLE).execute(&mut *conn).await?;
                info!("Table test_items ready");
                Ok::<_, AppError>(())
            })
            .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let mut conn = self.acquire().await?;
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, description, created_at FROM test_items \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    async fn create(&self, item: NewItem) -> Result<Item> {
        // No-op after the first successful bootstrap
        self.bootstrap().await?;

        let mut conn = self.acquire().await?;
        let created = sqlx::query_as::<_, Item>(
            "INSERT INTO test_items (name, description) VALUES ($1, $2) \
             RETURNING id, name, description, created_at",
        )
        .bind(&item.name)
        .bind(&item.description)
        .fetch_one(&mut *conn)
        .await?;

        Ok(created)
    }

    async fn delete(&self, id: i32) -> Result<Option<Item>> {
        let mut conn = self.acquire().await?;
        let deleted = sqlx::query_as::<_, Item>(
            "DELETE FROM test_items WHERE id = $1 \
             RETURNING id, name, description, created_at",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(deleted)
    }

    async fn summary(&self) -> Result<DatabaseSummary> {
        let mut conn = self.acquire().await?;

        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&mut *conn)
            .await?;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public'",
        )
        .fetch_all(&mut *conn)
        .await?;

        let database_size: String =
            sqlx::query_scalar("SELECT pg_size_pretty(pg_database_size(current_database()))")
                .fetch_one(&mut *conn)
                .await?;

        Ok(DatabaseSummary {
            version,
            tables,
            database_size,
        })
    }
}
