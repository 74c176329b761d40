//! Record storage capability and its backends.
//!
//! Everything above this crate talks to [`Storage`] only, so the mock
//! in-memory backend and the SQLite backend are interchangeable.

use async_trait::async_trait;
use shared::domain::{Todo, TodoId};
use thiserror::Error;

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Table holding the application's todo records.
pub const TODOS_TABLE: &str = "todos";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate id {id} in seed for table {table}")]
    DuplicateId { table: String, id: TodoId },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Replaces the contents of `table` with `records`, keeping their order.
    async fn seed(&self, table: &str, records: Vec<Todo>) -> Result<(), StoreError>;

    /// Returns every record of `table` in insertion order.
    async fn get(&self, table: &str) -> Result<Vec<Todo>, StoreError>;

    /// Overwrites the record with the same id in place, or appends it.
    async fn put(&self, table: &str, record: Todo) -> Result<(), StoreError>;

    /// Removes the record with `id`; returns whether one was removed.
    async fn delete(&self, table: &str, id: &TodoId) -> Result<bool, StoreError>;
}

fn ensure_unique_ids(table: &str, records: &[Todo]) -> Result<(), StoreError> {
    let mut seen = std::collections::HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(&record.id) {
            return Err(StoreError::DuplicateId {
                table: table.to_string(),
                id: record.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
