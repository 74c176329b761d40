use super::*;
use axum::{body, body::Body, http::Request, response::Response};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

async fn test_app() -> Router {
    let storage = MemoryStorage::seeded(TODOS_TABLE, vec![Todo::new("1", "A", "open")])
        .expect("seed");
    let orchestration = TodoOrchestration::new(Arc::new(storage));
    let session = Controller::load(orchestration.clone()).await.expect("load");
    build_router(Arc::new(AppState {
        orchestration,
        session: Mutex::new(session),
    }))
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn todo_routes_cover_create_update_delete() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("POST", "/todos", serde_json::json!({ "task": "B" })))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::OK);
    let todos: Vec<Todo> = read_json(response).await;
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[1].task, "B");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/todos",
            serde_json::json!({ "id": "1", "task": "A2", "status": "done" }),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let todos: Vec<Todo> = read_json(response).await;
    assert_eq!(todos[0], Todo::new("1", "A2", "done"));

    let request = Request::delete("/todos/1")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("delete");
    assert_eq!(response.status(), StatusCode::OK);
    let todos: Vec<Todo> = read_json(response).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].task, "B");

    let request = Request::get("/todos").body(Body::empty()).expect("request");
    let listed: Vec<Todo> = read_json(app.oneshot(request).await.expect("list")).await;
    assert_eq!(listed, todos);
}

#[tokio::test]
async fn blank_task_is_bad_request() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request("POST", "/todos", serde_json::json!({ "task": "  " })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = read_json(response).await;
    assert_eq!(err.code, ErrorCode::Validation);
}

#[tokio::test]
async fn update_of_unknown_id_is_not_found() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/todos",
            serde_json::json!({ "id": "missing", "task": "X" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_unknown_id_returns_unchanged_list() {
    let app = test_app().await;
    let request = Request::delete("/todos/missing")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let todos: Vec<Todo> = read_json(response).await;
    assert_eq!(todos, vec![Todo::new("1", "A", "open")]);
}

#[tokio::test]
async fn intents_drive_the_session_state() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/intents",
            serde_json::json!({ "type": "select", "payload": { "id": "1" } }),
        ))
        .await
        .expect("select");
    let state: RenderState = read_json(response).await;
    assert!(state.is_selected_visible);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/intents",
            serde_json::json!({ "type": "update", "payload": { "task": "A2", "status": "done" } }),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::OK);
    let state: RenderState = read_json(response).await;
    assert_eq!(state.selected, Some(Todo::new("1", "A2", "done")));

    let response = app
        .clone()
        .oneshot(json_request("POST", "/intents", serde_json::json!({ "type": "delete" })))
        .await
        .expect("delete");
    let state: RenderState = read_json(response).await;
    assert!(state.todos.is_empty());
    assert!(!state.is_selected_visible);

    let request = Request::get("/state").body(Body::empty()).expect("request");
    let fetched: RenderState = read_json(app.oneshot(request).await.expect("state")).await;
    assert_eq!(fetched, state);
}

#[tokio::test]
async fn rejected_intent_reports_error_in_state() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request(
            "POST",
            "/intents",
            serde_json::json!({ "type": "select", "payload": { "id": "1" } }),
        ))
        .await
        .expect("select");

    let response = app
        .oneshot(json_request(
            "POST",
            "/intents",
            serde_json::json!({ "type": "update", "payload": { "task": " ", "status": "done" } }),
        ))
        .await
        .expect("update");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let state: RenderState = read_json(response).await;
    assert_eq!(
        state.last_error.map(|err| err.code),
        Some(ErrorCode::Validation)
    );
    assert_eq!(state.todos, vec![Todo::new("1", "A", "open")]);
}

#[tokio::test]
async fn direct_writes_are_reflected_in_session_state() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("POST", "/todos", serde_json::json!({ "task": "B" })))
        .await
        .expect("create");

    let request = Request::get("/state").body(Body::empty()).expect("request");
    let state: RenderState = read_json(app.oneshot(request).await.expect("state")).await;
    assert_eq!(state.todos.len(), 2);
}

#[tokio::test]
async fn seed_file_populates_memory_backend() {
    let dir = tempfile::tempdir().expect("tempdir");
    let seed_path = dir.path().join("seed.json");
    std::fs::write(
        &seed_path,
        serde_json::json!([{ "id": "7", "task": "from file", "status": "open" }]).to_string(),
    )
    .expect("write seed");

    let settings = Settings {
        seed_file: Some(seed_path),
        ..Settings::default()
    };
    let storage = open_storage(&settings).await.expect("storage");
    assert_eq!(
        storage.get(TODOS_TABLE).await.expect("get"),
        vec![Todo::new("7", "from file", "open")]
    );
}

#[tokio::test]
async fn memory_backend_without_seed_file_gets_demo_records() {
    let storage = open_storage(&Settings::default()).await.expect("storage");
    assert_eq!(storage.get(TODOS_TABLE).await.expect("get").len(), 2);
}
