use serde::{Deserialize, Serialize};

use crate::{
    domain::{Todo, TodoId},
    error::ApiError,
};

/// User intents emitted by a view towards the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    Input {
        text: String,
    },
    Create {
        text: String,
    },
    Select {
        #[serde(default)]
        id: Option<TodoId>,
    },
    Update {
        task: String,
        status: String,
    },
    Delete,
    Refresh,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Input { .. } => "input",
            Intent::Create { .. } => "create",
            Intent::Select { .. } => "select",
            Intent::Update { .. } => "update",
            Intent::Delete => "delete",
            Intent::Refresh => "refresh",
        }
    }
}

/// Snapshot a view renders from. Replaced wholesale after each transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderState {
    pub todos: Vec<Todo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Todo>,
    pub is_selected_visible: bool,
    #[serde(default)]
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ApiError>,
}

impl RenderState {
    pub fn new(todos: Vec<Todo>, selected: Option<Todo>, input: String) -> Self {
        let is_selected_visible = selected.is_some();
        Self {
            todos,
            selected,
            is_selected_visible,
            input,
            last_error: None,
        }
    }

    pub fn find(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| &todo.id == id)
    }
}
