use client_core::Controller;
use server_api::TodoOrchestration;
use tokio::sync::Mutex;

pub(crate) struct AppState {
    pub(crate) orchestration: TodoOrchestration,
    pub(crate) session: Mutex<Controller>,
}
