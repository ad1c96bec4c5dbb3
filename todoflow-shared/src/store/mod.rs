/// Todo storage backends
///
/// [`TodoStore`] is the seam between the service layer and persistence.
/// Two implementations ship with the crate:
///
/// - [`postgres::PgTodoStore`]: the production backend on top of `sqlx`
/// - [`memory::InMemoryTodoStore`]: a process-local map for development and tests
///
/// Stores do not authorize. Mutating methods still take the owner and only
/// touch rows that belong to it, so a missed guard cannot leak a write
/// across users.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::todo::{NewTodo, Todo, TodoPatch};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTodoStore;
pub use postgres::PgTodoStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend is not usable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence operations for todos
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Looks up a todo by ID, regardless of owner
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// All todos of an owner, newest first
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError>;

    /// Inserts a new, open todo
    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError>;

    /// Flips `completed`; `None` if no row matched id and owner
    async fn toggle_completed(&self, id: Uuid, owner_id: Uuid)
        -> Result<Option<Todo>, StoreError>;

    /// Writes the patch; `None` if no row matched id and owner
    async fn apply_patch(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError>;

    /// Removes a todo; false if no row matched id and owner
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError>;

    /// Checks the backend is reachable
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Short backend name reported by the health endpoint
    fn backend_name(&self) -> &'static str;
}
