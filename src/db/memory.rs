//! In-memory item store with the same id and ordering rules as the table.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DatabaseSummary, Item, ItemStore, NewItem, ITEMS_TABLE};
use crate::error::Result;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Item>,
    /// Mirrors SERIAL: ids are never reused, even after deletes
    last_id: i32,
    created: bool,
}

/// Process-local [`ItemStore`] used by the test suites.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    table: RwLock<Table>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn bootstrap(&self) -> Result<()> {
        self.table.write().await.created = true;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let table = self.table.read().await;
        let mut rows = table.rows.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn create(&self, item: NewItem) -> Result<Item> {
        let mut table = self.table.write().await;
        table.created = true;
        table.last_id += 1;

        let row = Item {
            id: table.last_id,
            name: item.name,
            description: item.description,
            created_at: Utc::now().naive_utc(),
        };
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<Option<Item>> {
        let mut table = self.table.write().await;
        let position = table.rows.iter().position(|row| row.id == id);
        Ok(position.map(|index| table.rows.remove(index)))
    }

    async fn summary(&self) -> Result<DatabaseSummary> {
        let table = self.table.read().await;
        let tables = if table.created {
            vec![ITEMS_TABLE.to_string()]
        } else {
            Vec::new()
        };

        Ok(DatabaseSummary {
            version: "in-memory".to_string(),
            tables,
            database_size: format!("{} rows", table.rows.len()),
        })
    }
}
