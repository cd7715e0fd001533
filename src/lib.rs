//! Store Probe - a diagnostic web service for Postgres and Redis
//!
//! Exposes CRUD over a Postgres table and a namespaced Redis keyspace, plus
//! connectivity reports for both stores.

pub mod api;
pub mod config;
pub mod db;
pub mod diagnostics;
pub mod error;
pub mod kv;
pub mod models;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
