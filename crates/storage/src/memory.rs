use std::collections::HashMap;

use async_trait::async_trait;
use shared::domain::{Todo, TodoId};
use tokio::sync::RwLock;

use crate::{ensure_unique_ids, Storage, StoreError};

/// Mock backend: one ordered `Vec` per table, nothing persisted.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<HashMap<String, Vec<Todo>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(table: &str, records: Vec<Todo>) -> Result<Self, StoreError> {
        ensure_unique_ids(table, &records)?;
        let mut tables = HashMap::new();
        tables.insert(table.to_string(), records);
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn seed(&self, table: &str, records: Vec<Todo>) -> Result<(), StoreError> {
        ensure_unique_ids(table, &records)?;
        let count = records.len();
        self.tables.write().await.insert(table.to_string(), records);
        tracing::debug!(table, count, "seeded in-memory table");
        Ok(())
    }

    async fn get(&self, table: &str) -> Result<Vec<Todo>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(&self, table: &str, record: Todo) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|row| row.id == record.id) {
            Some(existing) => *existing = record,
            None => rows.push(record),
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &TodoId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| &row.id != id);
        Ok(rows.len() != before)
    }
}
