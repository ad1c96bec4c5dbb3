/// In-memory todo store
///
/// Keeps todos in a `HashMap` behind a `tokio::sync::RwLock`. Writes are
/// serialized by the lock, which gives the same single-record atomicity as
/// the SQL statements of the Postgres store. Nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TodoStore};
use crate::models::todo::{NewTodo, Todo, TodoPatch};

#[derive(Debug)]
struct StoredTodo {
    /// Insertion sequence, breaks `created_at` ties in listings
    seq: u64,
    todo: Todo,
}

#[derive(Debug, Default)]
struct Inner {
    todos: HashMap<Uuid, StoredTodo>,
    next_seq: u64,
}

/// Process-local todo store
#[derive(Debug, Clone, Default)]
pub struct InMemoryTodoStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored todos across all owners
    pub async fn len(&self) -> usize {
        self.inner.read().await.todos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.todos.get(&id).map(|stored| stored.todo.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let inner = self.inner.read().await;

        let mut owned: Vec<&StoredTodo> = inner
            .todos
            .values()
            .filter(|stored| stored.todo.owner_id == owner_id)
            .collect();
        owned.sort_by(|a, b| {
            b.todo
                .created_at
                .cmp(&a.todo.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(owned.into_iter().map(|stored| stored.todo.clone()).collect())
    }

    async fn insert(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        let mut inner = self.inner.write().await;

        if inner.todos.contains_key(&todo.id) {
            return Err(StoreError::Unavailable(format!(
                "Todo {} already exists",
                todo.id
            )));
        }

        let now = Utc::now();
        let record = Todo {
            id: todo.id,
            owner_id: todo.owner_id,
            title: todo.title,
            description: todo.description,
            completed: false,
            priority: todo.priority,
            due_date: todo.due_date,
            created_at: now,
            updated_at: now,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.todos.insert(
            record.id,
            StoredTodo {
                seq,
                todo: record.clone(),
            },
        );

        Ok(record)
    }

    async fn toggle_completed(
        &self,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.write().await;

        let Some(stored) = inner
            .todos
            .get_mut(&id)
            .filter(|stored| stored.todo.owner_id == owner_id)
        else {
            return Ok(None);
        };

        stored.todo.completed = !stored.todo.completed;
        stored.todo.updated_at = Utc::now();
        Ok(Some(stored.todo.clone()))
    }

    async fn apply_patch(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: TodoPatch,
    ) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.write().await;

        let Some(stored) = inner
            .todos
            .get_mut(&id)
            .filter(|stored| stored.todo.owner_id == owner_id)
        else {
            return Ok(None);
        };

        patch.apply_to(&mut stored.todo);
        stored.todo.updated_at = Utc::now();
        Ok(Some(stored.todo.clone()))
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;

        let owned = inner
            .todos
            .get(&id)
            .is_some_and(|stored| stored.todo.owner_id == owner_id);
        if owned {
            inner.todos.remove(&id);
        }

        Ok(owned)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
