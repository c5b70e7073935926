//! In-memory stand-in for the remote JSON API.
//!
//! Mirrors the conventions the client relies on: application failures are
//! reported as `{"error": true, "statusCode": ..., "message": ...}` bodies,
//! and a missing or wrong bearer token yields such an envelope with
//! `statusCode` 401 under an HTTP 200 status line.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
pub struct CreateNote {
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub body: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Note>>>;

#[derive(Clone)]
pub struct AppState {
    token: Arc<str>,
    notes: Db,
}

/// Error envelope in the shape the API uses.
pub fn envelope(status: StatusCode, message: &str) -> Value {
    json!({
        "error": true,
        "statusCode": status.as_u16(),
        "message": message,
    })
}

/// Router accepting `bearer <token>` on its protected routes.
pub fn app(token: &str) -> Router {
    let state = AppState {
        token: Arc::from(token),
        notes: Arc::new(RwLock::new(HashMap::new())),
    };

    let protected = Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", get(get_note).put(update_note).delete(delete_note))
        .route("/uploads", post(receive_upload))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/plain", get(plain))
        .route("/echo", any(echo))
        .merge(protected)
        .with_state(state)
}

pub async fn run(listener: TcpListener, token: &str) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock API listening");
    }
    axum::serve(listener, app(token)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("bearer {}", state.token);
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        debug!(uri = %request.uri(), "rejecting request without valid bearer token");
        return Json(envelope(StatusCode::UNAUTHORIZED, "Unauthorized")).into_response();
    }
    next.run(request).await
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(envelope(StatusCode::NOT_FOUND, "note not found")),
    )
}

async fn list_notes(State(state): State<AppState>) -> Json<Vec<Note>> {
    let notes = state.notes.read().await;
    Json(notes.values().cloned().collect())
}

async fn create_note(
    State(state): State<AppState>,
    Json(input): Json<CreateNote>,
) -> (StatusCode, Json<Note>) {
    let note = Note {
        id: Uuid::new_v4(),
        title: input.title,
        body: input.body,
    };
    state.notes.write().await.insert(note.id, note.clone());
    (StatusCode::CREATED, Json(note))
}

async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Note>, (StatusCode, Json<Value>)> {
    let notes = state.notes.read().await;
    notes.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateNote>,
) -> Result<Json<Note>, (StatusCode, Json<Value>)> {
    let mut notes = state.notes.write().await;
    let note = notes.get_mut(&id).ok_or_else(not_found)?;
    if let Some(title) = input.title {
        note.title = title;
    }
    if let Some(body) = input.body {
        note.body = body;
    }
    Ok(Json(note.clone()))
}

async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut notes = state.notes.write().await;
    notes.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or_else(not_found)
}

async fn receive_upload(headers: HeaderMap, body: Bytes) -> Json<Value> {
    Json(json!({
        "received": body.len(),
        "contentType": header_value(&headers, header::CONTENT_TYPE),
    }))
}

async fn plain() -> &'static str {
    "not-json"
}

/// Reports the request line and headers the client sent.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Value> {
    Json(json!({
        "method": method.as_str(),
        "accept": header_value(&headers, header::ACCEPT),
        "contentType": header_value(&headers, header::CONTENT_TYPE),
        "authorization": header_value(&headers, header::AUTHORIZATION),
        "body": String::from_utf8_lossy(&body),
    }))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
