//! SQLite-backed `TodoRepository`.
//!
//! The schema is created on connect if it does not exist yet. `AUTOINCREMENT`
//! keeps ids unique and never reused, also under concurrent inserts.

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::repository::{StoreError, TodoRepository};
use crate::{NewTodo, TodoItem, TodoPatch};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todo_items (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    title     TEXT    NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0
)
"#;

#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Open (creating if missing) the database at `database_url` and make
    /// sure the `todo_items` table exists.
    ///
    /// In-memory databases live and die with their connection, so they are
    /// held on a single connection that is never recycled.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };
        let pool = pool_options.connect_with(options).await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close every pooled connection. Later calls fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let todos = sqlx::query_as::<_, TodoItem>(
            "SELECT id, title, completed FROM todo_items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn create(&self, input: NewTodo) -> Result<TodoItem, StoreError> {
        let requested = input.requested_id();
        // A NULL id lets SQLite assign the next AUTOINCREMENT value.
        sqlx::query_as::<_, TodoItem>(
            "INSERT INTO todo_items (id, title, completed) VALUES (?, ?, ?) \
             RETURNING id, title, completed",
        )
        .bind(requested)
        .bind(input.title)
        .bind(input.completed)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let (sqlx::Error::Database(db), Some(id)) = (&err, requested) {
                if db.is_unique_violation() {
                    return StoreError::DuplicateId { id };
                }
            }
            StoreError::Sqlx(err)
        })
    }

    async fn update(&self, id: i64, patch: TodoPatch) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE todo_items \
             SET title = COALESCE(?, title), completed = COALESCE(?, completed) \
             WHERE id = ?",
        )
        .bind(patch.title)
        .bind(patch.completed)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM todo_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
