/// PostgreSQL todo store
///
/// Thin adapter from [`TodoStore`] onto the SQL in [`crate::models::todo`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, TodoStore};
use crate::db::pool::health_check;
use crate::models::todo::{NewTodo, Todo, TodoPatch};

/// Todo store backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, e.g. for closing on shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::find_by_id(&self.pool, id).await?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        Ok(Todo::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        Ok(Todo::create(&self.pool, todo).await?)
    }

    async fn toggle_completed(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::toggle_completed(&self.pool, id, owner_id).await?)
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        Ok(Todo::apply_patch(&self.pool, id, owner_id, patch).await?)
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        Ok(Todo::delete(&self.pool, id, owner_id).await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
