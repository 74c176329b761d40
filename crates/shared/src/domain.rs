use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status given to a newly created todo when the caller does not pick one.
pub const DEFAULT_STATUS: &str = "open";

/// Opaque todo identifier. Generated ids are UUID v4 strings, but seeded
/// records may carry any non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    pub status: String,
}

impl Todo {
    pub fn new(id: impl Into<TodoId>, task: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task: task.into(),
            status: status.into(),
        }
    }
}

/// Upsert input. A draft without an id creates a record; a draft with an id
/// edits the existing record carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TodoDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl TodoDraft {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            id: None,
            task: task.into(),
            status: None,
        }
    }

    pub fn for_existing(
        id: TodoId,
        task: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id),
            task: task.into(),
            status: Some(status.into()),
        }
    }
}

impl From<Todo> for TodoDraft {
    fn from(value: Todo) -> Self {
        Self {
            id: Some(value.id),
            task: value.task,
            status: Some(value.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(TodoId::generate(), TodoId::generate());
    }

    #[test]
    fn todo_id_serializes_as_plain_string() {
        let todo = Todo::new("1", "A", "open");
        let json = serde_json::to_value(&todo).expect("json");
        assert_eq!(json["id"], "1");
    }

    #[test]
    fn draft_without_id_deserializes_from_task_only() {
        let draft: TodoDraft = serde_json::from_str(r#"{"task":"write docs"}"#).expect("json");
        assert_eq!(draft, TodoDraft::new("write docs"));
    }
}
