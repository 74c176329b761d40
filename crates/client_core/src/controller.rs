use server_api::TodoOrchestration;
use shared::{
    domain::{Todo, TodoDraft, TodoId},
    error::ApiError,
    protocol::{Intent, RenderState},
};
use tokio::sync::watch;

/// Result of handling a single intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new snapshot was published.
    Changed,
    /// Precondition unmet; nothing was called and nothing was published.
    Unchanged,
    /// The data layer refused the change. Only `last_error` moved.
    Rejected(ApiError),
}

/// Owns the render state of one session.
///
/// Intents run to completion one at a time (`dispatch` takes `&mut self`).
/// Each handler builds a fresh [`RenderState`] that replaces the previous one
/// and is published once on the watch channel.
pub struct Controller {
    orchestration: TodoOrchestration,
    state: RenderState,
    notify: watch::Sender<RenderState>,
}

impl Controller {
    /// Builds a controller with the current collection already loaded.
    pub async fn load(orchestration: TodoOrchestration) -> Result<Self, ApiError> {
        let todos = orchestration.retrieve().await?;
        let state = RenderState::new(todos, None, String::new());
        let (notify, _) = watch::channel(state.clone());
        Ok(Self {
            orchestration,
            state,
            notify,
        })
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<RenderState> {
        self.notify.subscribe()
    }

    pub async fn dispatch(&mut self, intent: Intent) -> Outcome {
        let name = intent.name();
        let transition = match intent {
            Intent::Input { text } => Ok(self.on_input(text)),
            Intent::Create { text } => self.on_create(text).await,
            Intent::Select { id } => Ok(self.on_select(id)),
            Intent::Update { task, status } => self.on_update(task, status).await,
            Intent::Delete => self.on_delete().await,
            Intent::Refresh => self.on_refresh().await,
        };

        match transition {
            Ok(Some(next)) => {
                self.publish(next);
                tracing::debug!(intent = name, todos = self.state.todos.len(), "state changed");
                Outcome::Changed
            }
            Ok(None) => {
                tracing::trace!(intent = name, "intent skipped");
                Outcome::Unchanged
            }
            Err(err) => {
                tracing::warn!(intent = name, error = %err, "intent rejected");
                let mut next = self.state.clone();
                next.last_error = Some(err.clone());
                self.publish(next);
                Outcome::Rejected(err)
            }
        }
    }

    fn on_input(&self, text: String) -> Option<RenderState> {
        if text == self.state.input {
            return None;
        }
        Some(RenderState::new(
            self.state.todos.clone(),
            self.state.selected.clone(),
            text,
        ))
    }

    async fn on_create(&self, text: String) -> Result<Option<RenderState>, ApiError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let todos = self
            .orchestration
            .upsert_retrieve(TodoDraft::new(text))
            .await?;
        let selected = self.reselect(&todos);
        Ok(Some(RenderState::new(todos, selected, String::new())))
    }

    fn on_select(&self, id: Option<TodoId>) -> Option<RenderState> {
        let selected = id.and_then(|id| self.state.find(&id).cloned());
        if selected == self.state.selected {
            return None;
        }
        Some(RenderState::new(
            self.state.todos.clone(),
            selected,
            self.state.input.clone(),
        ))
    }

    async fn on_update(
        &self,
        task: String,
        status: String,
    ) -> Result<Option<RenderState>, ApiError> {
        let Some(selected) = &self.state.selected else {
            return Ok(None);
        };
        let todos = self
            .orchestration
            .upsert_retrieve(TodoDraft::for_existing(selected.id.clone(), task, status))
            .await?;
        let selected = self.reselect(&todos);
        Ok(Some(RenderState::new(todos, selected, self.state.input.clone())))
    }

    async fn on_delete(&self) -> Result<Option<RenderState>, ApiError> {
        let Some(selected) = &self.state.selected else {
            return Ok(None);
        };
        let todos = self.orchestration.delete_retrieve(&selected.id).await?;
        Ok(Some(RenderState::new(todos, None, self.state.input.clone())))
    }

    async fn on_refresh(&self) -> Result<Option<RenderState>, ApiError> {
        let todos = self.orchestration.retrieve().await?;
        let selected = self.reselect(&todos);
        Ok(Some(RenderState::new(todos, selected, self.state.input.clone())))
    }

    /// The selection follows its id into a refreshed collection.
    fn reselect(&self, todos: &[Todo]) -> Option<Todo> {
        let id = &self.state.selected.as_ref()?.id;
        todos.iter().find(|todo| &todo.id == id).cloned()
    }

    fn publish(&mut self, next: RenderState) {
        self.state = next;
        self.notify.send_replace(self.state.clone());
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
