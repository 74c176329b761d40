//! Data access layer for todo records.
//!
//! Every operation returns the whole refreshed collection so callers never
//! issue a follow-up read.

use std::sync::Arc;

use shared::{
    domain::{Todo, TodoDraft, TodoId, DEFAULT_STATUS},
    error::ApiError,
};
use storage::{Storage, StoreError, TODOS_TABLE};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct TodoOrchestration {
    storage: Arc<dyn Storage>,
    table: String,
    // Held across check-then-write so sessions sharing a store cannot interleave.
    write_lock: Arc<Mutex<()>>,
}

impl TodoOrchestration {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_table(storage, TODOS_TABLE)
    }

    pub fn with_table(storage: Arc<dyn Storage>, table: impl Into<String>) -> Self {
        Self {
            storage,
            table: table.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub async fn retrieve(&self) -> Result<Vec<Todo>, ApiError> {
        self.storage.get(&self.table).await.map_err(internal)
    }

    pub async fn upsert_retrieve(&self, draft: TodoDraft) -> Result<Vec<Todo>, ApiError> {
        let task = draft.task.trim();
        if task.is_empty() {
            tracing::warn!(table = %self.table, "rejected todo with empty task");
            return Err(ApiError::validation("task must not be empty"));
        }

        let _guard = self.write_lock.lock().await;
        let current = self.retrieve().await?;

        let record = match draft.id {
            None => Todo {
                id: fresh_id(&current),
                task: task.to_string(),
                status: draft.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            },
            Some(id) => {
                let Some(existing) = current.iter().find(|todo| todo.id == id) else {
                    tracing::warn!(table = %self.table, %id, "update for unknown todo");
                    return Err(ApiError::not_found(format!("todo {id} not found")));
                };
                Todo {
                    id,
                    task: task.to_string(),
                    status: draft.status.unwrap_or_else(|| existing.status.clone()),
                }
            }
        };

        let id = record.id.clone();
        self.storage
            .put(&self.table, record)
            .await
            .map_err(internal)?;
        tracing::debug!(table = %self.table, %id, "upserted todo");
        self.retrieve().await
    }

    pub async fn delete_retrieve(&self, id: &TodoId) -> Result<Vec<Todo>, ApiError> {
        let _guard = self.write_lock.lock().await;
        let removed = self
            .storage
            .delete(&self.table, id)
            .await
            .map_err(internal)?;
        tracing::debug!(table = %self.table, %id, removed, "delete todo");
        self.retrieve().await
    }
}

fn fresh_id(existing: &[Todo]) -> TodoId {
    loop {
        let id = TodoId::generate();
        if existing.iter().all(|todo| todo.id != id) {
            return id;
        }
    }
}

fn internal(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "storage failure");
    ApiError::internal(err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
