#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use synapse::config::Settings;
use synapse::models::AppState;
use synapse::routes::build_router;

pub const CSRF_TOKEN: &str = "tok123";

/// Scripted backend state shared with the test body.
pub struct Backend {
    pub instances: Mutex<(StatusCode, String)>,
    pub images: Mutex<Value>,
    pub action_reply: Mutex<(StatusCode, String)>,
    pub create_reply: Mutex<(StatusCode, Value)>,
    pub is_staff: Mutex<bool>,
    pub csrf_seen: Mutex<Vec<Option<String>>>,
    pub action_calls: Mutex<Vec<String>>,
    pub create_calls: Mutex<usize>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            instances: Mutex::new((StatusCode::OK, "[]".to_string())),
            images: Mutex::new(json!([])),
            action_reply: Mutex::new((StatusCode::OK, r#"{"message":"ok"}"#.to_string())),
            create_reply: Mutex::new((StatusCode::CREATED, json!({"instance_id": "new123"}))),
            is_staff: Mutex::new(false),
            csrf_seen: Mutex::new(Vec::new()),
            action_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(0),
        }
    }
}

impl Backend {
    pub fn set_instances(&self, status: StatusCode, body: &str) {
        *self.instances.lock().unwrap() = (status, body.to_string());
    }

    pub fn set_action_reply(&self, status: StatusCode, body: &str) {
        *self.action_reply.lock().unwrap() = (status, body.to_string());
    }

    pub fn create_calls(&self) -> usize {
        *self.create_calls.lock().unwrap()
    }
}

type Shared = Arc<Backend>;

fn logged_in(headers: &HeaderMap) -> bool {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("sessionid=s1"))
}

fn record_csrf(state: &Backend, headers: &HeaderMap) {
    let token = headers
        .get("X-CSRFToken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.csrf_seen.lock().unwrap().push(token);
}

fn raw(status: StatusCode, body: String) -> Response {
    (status, [(axum::http::header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record_csrf(&state, &headers);
    if body["password"] != "secret" {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid credentials"}))).into_response();
    }
    (
        AppendHeaders([
            (SET_COOKIE, "sessionid=s1; Path=/; HttpOnly"),
            (SET_COOKIE, "csrftoken=tok123; Path=/"),
        ]),
        Json(json!({"detail": "Logged in"})),
    )
        .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record_csrf(&state, &headers);
    (
        AppendHeaders([(SET_COOKIE, "sessionid=; Path=/; Max-Age=0")]),
        StatusCode::NO_CONTENT,
    )
        .into_response()
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        )
            .into_response();
    }
    let is_staff = *state.is_staff.lock().unwrap();
    Json(json!({
        "username": "alice",
        "email": "alice@example.com",
        "is_staff": is_staff,
        "ssh_public_key": null
    }))
    .into_response()
}

async fn instance_list(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not logged in"}))).into_response();
    }
    let (status, body) = state.instances.lock().unwrap().clone();
    raw(status, body)
}

async fn instance_create(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record_csrf(&state, &headers);
    *state.create_calls.lock().unwrap() += 1;
    let (status, body) = state.create_reply.lock().unwrap().clone();
    (status, Json(body)).into_response()
}

async fn instance_action(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    record_csrf(&state, &headers);
    state.action_calls.lock().unwrap().push(format!("{}:{}", id, action));
    let (status, body) = state.action_reply.lock().unwrap().clone();
    raw(status, body)
}

async fn image_list(State(state): State<Shared>) -> Response {
    Json(state.images.lock().unwrap().clone()).into_response()
}

async fn server_list(State(state): State<Shared>) -> Response {
    if !*state.is_staff.lock().unwrap() {
        return (StatusCode::FORBIDDEN, Json(json!({"detail": "Forbidden"}))).into_response();
    }
    Json(json!({"results": [{"id": 1, "hostname": "gpu01", "ip_address": "10.0.0.5", "is_active": true}]})).into_response()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start the fake backend and return its base URL.
pub async fn spawn_backend(state: Shared) -> String {
    let app = Router::new()
        .route("/api/login/", post(login))
        .route("/api/logout/", post(logout))
        .route("/api/profile/", get(profile))
        .route("/api/instance/list/", get(instance_list))
        .route("/api/instance/create/", post(instance_create))
        .route("/api/instances/:id/:action/", post(instance_action))
        .route("/api/image/list/", get(image_list))
        .route("/api/server/list/", get(server_list))
        .with_state(state);
    format!("http://{}", serve(app).await)
}

pub fn settings(api_base_url: &str) -> Settings {
    Settings {
        api_base_url: api_base_url.to_string(),
        poll_interval: Duration::from_secs(20),
        settle_delay: Duration::from_secs(3),
        session_file: std::env::temp_dir().join("synapse-test-session.json"),
    }
}

/// Start the dashboard against `backend_url` and return its base URL.
pub async fn spawn_dashboard(backend_url: &str) -> String {
    serve_dashboard(AppState::new(settings(backend_url))).await
}

/// Serve a dashboard whose state the test keeps a handle on.
pub async fn serve_dashboard(state: AppState) -> String {
    format!("http://{}", serve(build_router(state)).await)
}

/// Browser stand-in: keeps the dashboard cookie and follows redirects.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

pub const RUNNING_INSTANCE: &str = r#"[{"instance_id":"abc123def456789","status":"running","server_hostname":"gpu01","image_name":"pytorch:latest","created_at":"2025-04-18T10:00:00Z","ssh_host_port":2222}]"#;
