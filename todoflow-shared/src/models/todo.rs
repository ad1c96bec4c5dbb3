/// Todo model and database operations
///
/// A todo is a single task owned by exactly one user. Every statement that
/// modifies a row carries the owner in its predicate, so a write can never
/// land on another user's record even if a caller skipped the guard.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE todo_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     priority todo_priority NOT NULL,
///     due_date BIGINT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use todoflow_shared::models::todo::{NewTodo, Priority, Todo};
/// use todoflow_shared::db::pool::{create_pool, PoolConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(PoolConfig::default()).await?;
/// let owner_id = Uuid::new_v4();
///
/// let todo = Todo::create(&pool, NewTodo {
///     id: Uuid::new_v4(),
///     owner_id,
///     title: "Buy milk".to_string(),
///     description: None,
///     priority: Priority::Low,
///     due_date: None,
/// }).await?;
///
/// Todo::toggle_completed(&pool, todo.id, owner_id).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TODO_COLUMNS: &str = "id, owner_id, title, description, completed, priority, \
                            due_date, created_at, updated_at";

/// Todo priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Converts priority to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Todo model representing one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo ID
    pub id: Uuid,

    /// User who owns this todo
    pub owner_id: Uuid,

    /// Short title, never empty after trimming
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Whether the todo has been completed
    pub completed: bool,

    /// Priority level
    pub priority: Priority,

    /// Due date as epoch milliseconds
    pub due_date: Option<i64>,

    /// When the todo was created
    pub created_at: DateTime<Utc>,

    /// When the todo was last written
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Returns true when the due date has passed and the todo is still open
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now_ms)
    }
}

/// Input for inserting a todo
///
/// Values are expected to be validated and normalized already.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<i64>,
}

/// Update instruction for a nullable column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the stored value alone
    #[default]
    Keep,

    /// Overwrite with a new value
    Set(T),

    /// Reset to NULL
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    fn apply(self, target: &mut Option<T>) {
        match self {
            FieldUpdate::Keep => {}
            FieldUpdate::Set(value) => *target = Some(value),
            FieldUpdate::Clear => *target = None,
        }
    }
}

/// Validated partial update for a todo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: FieldUpdate<String>,
    pub priority: Option<Priority>,
    pub due_date: FieldUpdate<i64>,
}

impl TodoPatch {
    /// True when the patch would not change any field
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_keep()
            && self.priority.is_none()
            && self.due_date.is_keep()
    }

    /// Applies the patch to an in-memory record
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        self.description.apply(&mut todo.description);
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        self.due_date.apply(&mut todo.due_date);
    }
}

impl Todo {
    /// Inserts a new todo in the open (not completed) state
    pub async fn create(pool: &PgPool, data: NewTodo) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (id, owner_id, title, description, priority, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TODO_COLUMNS}"
        );

        let todo = sqlx::query_as::<_, Todo>(&query)
            .bind(data.id)
            .bind(data.owner_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.priority)
            .bind(data.due_date)
            .fetch_one(pool)
            .await?;

        Ok(todo)
    }

    /// Finds a todo by ID regardless of owner
    ///
    /// The caller is responsible for the ownership check; see
    /// [`crate::auth::authorization::require_owned_todo`].
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1");

        let todo = sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(todo)
    }

    /// Lists all todos of an owner, newest first
    ///
    /// Rows sharing a creation timestamp come back in reverse insertion order.
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TODO_COLUMNS} FROM todos \
             WHERE owner_id = $1 \
             ORDER BY created_at DESC, seq DESC"
        );

        let todos = sqlx::query_as::<_, Todo>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await?;

        Ok(todos)
    }

    /// Flips the completed flag in a single statement
    ///
    /// Concurrent toggles are last-write-wins.
    pub async fn toggle_completed(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE todos \
             SET completed = NOT completed, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {TODO_COLUMNS}"
        );

        let todo = sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

        Ok(todo)
    }

    /// Writes the fields present in the patch
    pub async fn apply_patch(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE todos SET updated_at = NOW()");
        let mut bind_count = 2;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        match patch.description {
            FieldUpdate::Set(_) => {
                bind_count += 1;
                query.push_str(&format!(", description = ${}", bind_count));
            }
            FieldUpdate::Clear => query.push_str(", description = NULL"),
            FieldUpdate::Keep => {}
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        match patch.due_date {
            FieldUpdate::Set(_) => {
                bind_count += 1;
                query.push_str(&format!(", due_date = ${}", bind_count));
            }
            FieldUpdate::Clear => query.push_str(", due_date = NULL"),
            FieldUpdate::Keep => {}
        }

        query.push_str(&format!(
            " WHERE id = $1 AND owner_id = $2 RETURNING {TODO_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Todo>(&query).bind(id).bind(owner_id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let FieldUpdate::Set(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let FieldUpdate::Set(due_date) = patch.due_date {
            q = q.bind(due_date);
        }

        let todo = q.fetch_optional(pool).await?;

        Ok(todo)
    }

    /// Permanently deletes a todo
    pub async fn delete(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
