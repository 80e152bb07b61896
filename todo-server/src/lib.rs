//! Todo list HTTP API.
//!
//! # Overview
//! `app` builds the route table over any `TodoRepository`; `server`
//! wires the SQLite repository and the listener through a `Lifecycle`.
//!
//! | Method | Path          | Success                                   |
//! |--------|---------------|-------------------------------------------|
//! | GET    | `/todos`      | `[TodoItem, ...]`                         |
//! | POST   | `/todos`      | `{"data": TodoItem}`                      |
//! | PUT    | `/todos/{id}` | `{"data": true}`                          |
//! | DELETE | `/todos/{id}` | `{"message": "Todo item deleted successfully"}` |
//!
//! Errors are `{"error": "..."}` with the status chosen by `ApiError`.

pub mod config;
pub mod error;
pub mod repository;
pub mod server;
pub mod sqlite;

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, put},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use repository::{MemoryTodoRepository, StoreError, TodoRepository};
pub use sqlite::SqliteTodoRepository;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TodoItem {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

/// Payload for `POST /todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewTodo {
    /// Explicit id to insert with. Absent and `0` both mean "assign one".
    pub fn requested_id(&self) -> Option<i64> {
        self.id.filter(|id| *id != 0)
    }
}

/// Payload for `PUT /todos/{id}`. Only present fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoPatch {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: Option<String>,
    pub completed: Option<bool>,
}

/// Optional payload for `DELETE /todos/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteTodo {
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct Data<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

pub type SharedRepo = Arc<dyn TodoRepository>;

pub fn app(repo: SharedRepo) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .layer(TraceLayer::new_for_http())
        .with_state(repo)
}

async fn list_todos(State(repo): State<SharedRepo>) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let todos = repo
        .list()
        .await
        .map_err(|source| ApiError::storage("Failed to list todo items", source))?;
    Ok(Json(todos))
}

async fn create_todo(
    State(repo): State<SharedRepo>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<Json<Data<TodoItem>>, ApiError> {
    let Json(input) = payload?;
    let todo = repo
        .create(input)
        .await
        .map_err(|source| ApiError::storage("Failed to create todo item", source))?;
    tracing::info!(id = todo.id, "todo item created");
    Ok(Json(Data { data: todo }))
}

async fn update_todo(
    State(repo): State<SharedRepo>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Data<bool>>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    ensure_path_id(id, patch.id)?;

    // Every update failure is reported as 404, including storage errors.
    repo.update(id, patch).await.map_err(ApiError::NotFound)?;
    tracing::info!(id, "todo item updated");
    Ok(Json(Data { data: true }))
}

async fn delete_todo(
    State(repo): State<SharedRepo>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Message>, ApiError> {
    let Path(id) = id?;
    let input: DeleteTodo = parse_optional_body(&body?)?;
    ensure_path_id(id, input.id)?;

    let removed = repo
        .delete(id)
        .await
        .map_err(|source| ApiError::storage("Failed to delete", source))?;
    if removed {
        tracing::info!(id, "todo item deleted");
    } else {
        tracing::debug!(id, "delete matched no todo item");
    }
    Ok(Json(Message {
        message: "Todo item deleted successfully",
    }))
}

/// The path id is authoritative; a non-zero body id must agree with it.
fn ensure_path_id(path_id: i64, body_id: Option<i64>) -> Result<(), ApiError> {
    match body_id {
        Some(body_id) if body_id != 0 && body_id != path_id => Err(ApiError::BadRequest(format!(
            "body id {body_id} does not match path id {path_id}"
        ))),
        _ => Ok(()),
    }
}

/// An empty (or whitespace-only) body yields `T::default()`.
fn parse_optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| ApiError::BadRequest(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_to_json() {
        let todo = TodoItem {
            id: 7,
            title: "Test".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Test");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn new_todo_defaults_completed_to_false() {
        let input: NewTodo = serde_json::from_str(r#"{"title":"No completed field"}"#).unwrap();
        assert_eq!(input.title, "No completed field");
        assert!(!input.completed);
        assert_eq!(input.requested_id(), None);
    }

    #[test]
    fn new_todo_rejects_missing_title() {
        let result: Result<NewTodo, _> = serde_json::from_str(r#"{"completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn zero_id_means_auto_assign() {
        let input: NewTodo = serde_json::from_str(r#"{"id":0,"title":"t"}"#).unwrap();
        assert_eq!(input.requested_id(), None);
        let input: NewTodo = serde_json::from_str(r#"{"id":12,"title":"t"}"#).unwrap();
        assert_eq!(input.requested_id(), Some(12));
    }

    #[test]
    fn patch_fields_are_all_optional() {
        let patch: TodoPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.id.is_none());
        assert!(patch.title.is_none());
        assert!(patch.completed.is_none());

        let patch: TodoPatch = serde_json::from_str(r#"{"completed":false}"#).unwrap();
        assert_eq!(patch.completed, Some(false));
        assert!(patch.title.is_none());
    }

    #[test]
    fn body_id_must_match_path_id() {
        assert!(ensure_path_id(3, None).is_ok());
        assert!(ensure_path_id(3, Some(0)).is_ok());
        assert!(ensure_path_id(3, Some(3)).is_ok());
        assert!(matches!(
            ensure_path_id(3, Some(4)),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn empty_delete_body_is_default() {
        let input: DeleteTodo = parse_optional_body(b"").unwrap();
        assert!(input.id.is_none());
        let input: DeleteTodo = parse_optional_body(b"  \n").unwrap();
        assert!(input.id.is_none());
        let input: DeleteTodo = parse_optional_body(br#"{"id":5,"title":"x"}"#).unwrap();
        assert_eq!(input.id, Some(5));
        assert!(parse_optional_body::<DeleteTodo>(b"{oops").is_err());
    }
}
