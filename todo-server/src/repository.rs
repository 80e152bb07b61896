//! Persistence seam for todo items.
//!
//! # Design
//! Handlers only see `TodoRepository`, so the same router runs over SQLite
//! in production and over `MemoryTodoRepository` in tests. Both
//! implementations follow the same id policy: an explicit non-zero id is
//! inserted as given, otherwise the next id after the highest one ever
//! assigned is used.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{NewTodo, TodoItem, TodoPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("todo item {id} not found")]
    NotFound { id: i64 },

    #[error("todo item {id} already exists")]
    DuplicateId { id: i64 },

    #[error("no todo id left after {last_id}")]
    IdSpaceExhausted { last_id: i64 },
}

#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All items, ordered by id.
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError>;

    /// Insert an item and return it with its assigned id.
    async fn create(&self, input: NewTodo) -> Result<TodoItem, StoreError>;

    /// Apply the present fields of `patch` to item `id`.
    async fn update(&self, id: i64, patch: TodoPatch) -> Result<(), StoreError>;

    /// Remove item `id`. Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<i64, TodoItem>,
    last_id: i64,
}

/// In-process repository backed by a `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryTodoRepository {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoRepository for MemoryTodoRepository {
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let state = self.state.read().await;
        Ok(state.items.values().cloned().collect())
    }

    async fn create(&self, input: NewTodo) -> Result<TodoItem, StoreError> {
        let mut state = self.state.write().await;
        let id = match input.requested_id() {
            Some(id) if state.items.contains_key(&id) => {
                return Err(StoreError::DuplicateId { id });
            }
            Some(id) => id,
            None => state
                .last_id
                .checked_add(1)
                .ok_or(StoreError::IdSpaceExhausted {
                    last_id: state.last_id,
                })?,
        };
        state.last_id = state.last_id.max(id);

        let todo = TodoItem {
            id,
            title: input.title,
            completed: input.completed,
        };
        state.items.insert(id, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let todo = state
            .items
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.state.write().await.items.remove(&id).is_some())
    }
}
