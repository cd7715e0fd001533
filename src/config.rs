//! Configuration Module
//!
//! Handles loading server and store connection settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Postgres host name
    pub postgres_host: String,
    /// Postgres port
    pub postgres_port: u16,
    /// Postgres database name
    pub postgres_db: String,
    /// Postgres user
    pub postgres_user: String,
    /// Postgres password
    pub postgres_password: String,
    /// Upper bound on pooled Postgres connections
    pub pg_max_connections: u32,
    /// How long a request waits for a pooled connection, in seconds
    pub pg_acquire_timeout: u64,
    /// Redis connection URL
    pub redis_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `POSTGRES_HOST` - Postgres host (default: localhost)
    /// - `POSTGRES_PORT` - Postgres port (default: 5432)
    /// - `POSTGRES_DB` - Database name (default: postgres)
    /// - `POSTGRES_USER` - Database user (default: postgres)
    /// - `POSTGRES_PASSWORD` - Database password (default: postgres)
    /// - `PG_MAX_CONNECTIONS` - Pool size (default: 10)
    /// - `PG_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 5)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            postgres_host: string_var("POSTGRES_HOST", defaults.postgres_host),
            postgres_port: parse_var("POSTGRES_PORT", defaults.postgres_port),
            postgres_db: string_var("POSTGRES_DB", defaults.postgres_db),
            postgres_user: string_var("POSTGRES_USER", defaults.postgres_user),
            postgres_password: string_var("POSTGRES_PASSWORD", defaults.postgres_password),
            pg_max_connections: parse_var("PG_MAX_CONNECTIONS", defaults.pg_max_connections),
            pg_acquire_timeout: parse_var("PG_ACQUIRE_TIMEOUT_SECS", defaults.pg_acquire_timeout),
            redis_url: string_var("REDIS_URL", defaults.redis_url),
        }
    }

    /// Connection options for the Postgres pool.
    pub fn pg_connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.postgres_host)
            .port(self.postgres_port)
            .database(&self.postgres_db)
            .username(&self.postgres_user)
            .password(&self.postgres_password)
    }

    /// Pool acquire timeout as a Duration.
    pub fn pg_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.pg_acquire_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            postgres_host: "localhost".to_string(),
            postgres_port: 5432,
            postgres_db: "postgres".to_string(),
            postgres_user: "postgres".to_string(),
            postgres_password: "postgres".to_string(),
            pg_max_connections: 10,
            pg_acquire_timeout: 5,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

fn string_var(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
