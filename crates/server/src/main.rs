use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use client_core::{Controller, Outcome};
use server_api::TodoOrchestration;
use shared::{
    domain::{Todo, TodoDraft, TodoId, DEFAULT_STATUS},
    error::{ApiError, ErrorCode},
    protocol::{Intent, RenderState},
};
use storage::{MemoryStorage, SqliteStorage, Storage, TODOS_TABLE};
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, Settings, StorageBackend};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let storage = open_storage(&settings).await?;
    let orchestration = TodoOrchestration::new(storage);
    let session = Controller::load(orchestration.clone())
        .await
        .context("failed to load initial todo list")?;

    let state = AppState {
        orchestration,
        session: Mutex::new(session),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, backend = ?settings.storage_backend, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn open_storage(settings: &Settings) -> anyhow::Result<Arc<dyn Storage>> {
    let seed = match &settings.seed_file {
        Some(path) => Some(load_seed(path).await?),
        None => None,
    };

    let storage: Arc<dyn Storage> = match settings.storage_backend {
        StorageBackend::Memory => {
            let records = seed.unwrap_or_else(demo_records);
            info!(count = records.len(), "seeding in-memory storage");
            Arc::new(MemoryStorage::seeded(TODOS_TABLE, records)?)
        }
        StorageBackend::Sqlite => {
            let database_url = &settings.database_url;
            let sqlite = SqliteStorage::connect(database_url).await.map_err(|error| {
                error!(
                    %database_url,
                    %error,
                    "failed to open SQLite database; verify parent directory exists and permissions are correct"
                );
                error
            })?;
            if let Some(records) = seed {
                info!(count = records.len(), "seeding sqlite storage");
                sqlite.seed(TODOS_TABLE, records).await?;
            }
            Arc::new(sqlite)
        }
    };
    Ok(storage)
}

async fn load_seed(path: &Path) -> anyhow::Result<Vec<Todo>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("seed file {} is not a JSON list of todos", path.display()))
}

fn demo_records() -> Vec<Todo> {
    vec![
        Todo::new(TodoId::generate(), "Sketch the board layout", DEFAULT_STATUS),
        Todo::new(TodoId::generate(), "Wire up the storage layer", "done"),
    ]
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/todos", get(http_list_todos).post(http_upsert_todo))
        .route("/todos/:id", delete(http_delete_todo))
        .route("/state", get(http_get_state))
        .route("/intents", post(http_dispatch_intent))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state.orchestration.retrieve().await.map_err(reject)?;
    Ok(Json(todos))
}

async fn http_upsert_todo(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TodoDraft>,
) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state
        .orchestration
        .upsert_retrieve(draft)
        .await
        .map_err(reject)?;
    resync_session(&state).await;
    Ok(Json(todos))
}

async fn http_delete_todo(
    State(state): State<Arc<AppState>>,
    UrlPath(id): UrlPath<String>,
) -> ApiResult<Json<Vec<Todo>>> {
    let todos = state
        .orchestration
        .delete_retrieve(&TodoId(id))
        .await
        .map_err(reject)?;
    resync_session(&state).await;
    Ok(Json(todos))
}

async fn http_get_state(State(state): State<Arc<AppState>>) -> Json<RenderState> {
    Json(state.session.lock().await.state().clone())
}

async fn http_dispatch_intent(
    State(state): State<Arc<AppState>>,
    Json(intent): Json<Intent>,
) -> impl IntoResponse {
    let mut session = state.session.lock().await;
    let status = match session.dispatch(intent).await {
        Outcome::Changed | Outcome::Unchanged => StatusCode::OK,
        Outcome::Rejected(err) => status_for(err.code),
    };
    (status, Json(session.state().clone()))
}

/// Direct `/todos` writes bypass the session, so pull the fresh list into it.
async fn resync_session(state: &AppState) {
    let mut session = state.session.lock().await;
    if let Outcome::Rejected(err) = session.dispatch(Intent::Refresh).await {
        warn!(error = %err, "session refresh after direct write failed");
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
