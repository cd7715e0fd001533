//! Relational Module
//!
//! The `test_items` table and the store trait the handlers talk to.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;

pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;

/// Table backing the item endpoints
pub const ITEMS_TABLE: &str = "test_items";

// == Item ==
/// A stored row. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Fields supplied by the caller on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
}

/// Server facts reported by the database diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    pub version: String,
    pub tables: Vec<String>,
    pub database_size: String,
}

// == Store Trait ==
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Creates the items table if it does not exist. Idempotent.
    async fn bootstrap(&self) -> Result<()>;

    /// All items, newest first.
    async fn list(&self) -> Result<Vec<Item>>;

    async fn create(&self, item: NewItem) -> Result<Item>;

    /// Removes and returns the row, or `None` when no row had that id.
    async fn delete(&self, id: i32) -> Result<Option<Item>>;

    async fn summary(&self) -> Result<DatabaseSummary>;
}
