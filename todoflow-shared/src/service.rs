/// Todo operations
///
/// [`TodoService`] is the single entry point for list, create, toggle,
/// update, delete and stats. Every method takes the caller's
/// [`AuthContext`] explicitly; mutations of an existing todo load the
/// record, run it through the ownership guard and only then touch the
/// store. Successful mutations are published on the [`ChangeHub`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use todoflow_shared::auth::middleware::AuthContext;
/// use todoflow_shared::events::ChangeHub;
/// use todoflow_shared::models::todo::Priority;
/// use todoflow_shared::service::{CreateTodo, TodoService};
/// use todoflow_shared::store::InMemoryTodoStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), todoflow_shared::service::TodoError> {
/// let service = TodoService::new(Arc::new(InMemoryTodoStore::new()), ChangeHub::default());
/// let auth = AuthContext::new(Uuid::new_v4());
///
/// let id = service
///     .create_todo(&auth, CreateTodo::new("Buy milk", Priority::Low))
///     .await?;
/// let todo = service.toggle_todo(&auth, id).await?;
/// assert!(todo.completed);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::authorization::{require_owned_todo, AuthzError};
use crate::auth::middleware::{AuthContext, AuthError};
use crate::events::{ChangeHub, ChangeKind, ChangeSubscription, TodoChange};
use crate::models::stats::TodoStats;
use crate::models::todo::{FieldUpdate, NewTodo, Priority, Todo, TodoPatch};
use crate::store::{StoreError, TodoStore};

/// Error type for todo operations
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// No verified identity
    #[error("Not authenticated")]
    Unauthenticated,

    /// No todo with this ID
    #[error("Todo {0} not found")]
    NotFound(Uuid),

    /// Todo belongs to another user
    #[error("Not authorized")]
    Forbidden,

    /// Input rejected
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<ValidationErrorDetail>),

    /// Storage failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<AuthzError> for TodoError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotFound(id) => TodoError::NotFound(id),
            AuthzError::NotOwner => TodoError::Forbidden,
        }
    }
}

impl From<AuthError> for TodoError {
    fn from(_: AuthError) -> Self {
        TodoError::Unauthenticated
    }
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn collect_details(errors: &ValidationErrors) -> Vec<ValidationErrorDetail> {
    let mut details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Trims a description; blank becomes `None`
fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Create request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTodo {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,

    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    pub priority: Priority,

    /// Epoch milliseconds
    pub due_date: Option<i64>,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority,
            due_date: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_due_date(mut self, due_date: i64) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Trims text fields and checks limits
    fn into_new_todo(self, owner_id: Uuid) -> Result<NewTodo, TodoError> {
        let normalized = CreateTodo {
            title: self.title.trim().to_string(),
            description: normalize_description(self.description),
            ..self
        };

        let mut details = match normalized.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => collect_details(&errors),
        };
        if normalized.title.is_empty() {
            details.insert(0, ValidationErrorDetail::new("title", "Title cannot be empty"));
        }
        if !details.is_empty() {
            return Err(TodoError::Validation(details));
        }

        Ok(NewTodo {
            id: Uuid::new_v4(),
            owner_id,
            title: normalized.title,
            description: normalized.description,
            priority: normalized.priority,
            due_date: normalized.due_date,
        })
    }
}

/// Partial update request
///
/// Omitted fields stay unchanged. `description` and `due_date` can only be
/// removed through their `clear_*` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTodo {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    pub priority: Option<Priority>,

    /// Epoch milliseconds
    pub due_date: Option<i64>,

    #[serde(default)]
    pub clear_description: bool,

    #[serde(default)]
    pub clear_due_date: bool,
}

impl UpdateTodo {
    /// Validates the request and lowers it to a [`TodoPatch`]
    pub fn into_patch(self) -> Result<TodoPatch, TodoError> {
        let normalized = UpdateTodo {
            title: self.title.map(|t| t.trim().to_string()),
            // A blank description counts as omitted
            description: normalize_description(self.description),
            ..self
        };

        let mut details = match normalized.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => collect_details(&errors),
        };
        if normalized.title.as_deref() == Some("") {
            details.push(ValidationErrorDetail::new("title", "Title cannot be empty"));
        }
        if normalized.description.is_some() && normalized.clear_description {
            details.push(ValidationErrorDetail::new(
                "clear_description",
                "Cannot set and clear description in the same update",
            ));
        }
        if normalized.due_date.is_some() && normalized.clear_due_date {
            details.push(ValidationErrorDetail::new(
                "clear_due_date",
                "Cannot set and clear due_date in the same update",
            ));
        }
        if !details.is_empty() {
            return Err(TodoError::Validation(details));
        }

        Ok(TodoPatch {
            title: normalized.title,
            description: field_update(normalized.description, normalized.clear_description),
            priority: normalized.priority,
            due_date: field_update(normalized.due_date, normalized.clear_due_date),
        })
    }
}

fn field_update<T>(value: Option<T>, clear: bool) -> FieldUpdate<T> {
    match (value, clear) {
        (Some(value), _) => FieldUpdate::Set(value),
        (None, true) => FieldUpdate::Clear,
        (None, false) => FieldUpdate::Keep,
    }
}

/// List and stats from a single read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSnapshot {
    pub todos: Vec<Todo>,
    pub stats: TodoStats,
}

/// Todo operations over a store and a change hub
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
    hub: ChangeHub,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>, hub: ChangeHub) -> Self {
        Self { store, hub }
    }

    /// Name of the storage backend
    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Checks the storage backend
    pub async fn health_check(&self) -> Result<(), TodoError> {
        self.store.health_check().await.map_err(|e| {
            error!(error = %e, "Store health check failed");
            TodoError::Store(e)
        })
    }

    /// All of the caller's todos, newest first
    pub async fn list_todos(&self, auth: &AuthContext) -> Result<Vec<Todo>, TodoError> {
        let todos = self
            .store
            .list_by_owner(auth.user_id)
            .await
            .map_err(|e| store_failure(e, auth, "list todos"))?;

        debug!(user_id = %auth.user_id, count = todos.len(), "Listed todos");
        Ok(todos)
    }

    /// Creates a todo and returns its ID
    pub async fn create_todo(&self, auth: &AuthContext, input: CreateTodo) -> Result<Uuid, TodoError> {
        let new_todo = input.into_new_todo(auth.user_id)?;

        let todo = self
            .store
            .insert(new_todo)
            .await
            .map_err(|e| store_failure(e, auth, "create todo"))?;

        info!(user_id = %auth.user_id, todo_id = %todo.id, "Todo created");
        self.publish(auth, todo.id, ChangeKind::Created);
        Ok(todo.id)
    }

    /// Flips the completed flag
    pub async fn toggle_todo(&self, auth: &AuthContext, id: Uuid) -> Result<Todo, TodoError> {
        self.load_owned(auth, id).await?;

        let todo = self
            .store
            .toggle_completed(id, auth.user_id)
            .await
            .map_err(|e| store_failure(e, auth, "toggle todo"))?
            .ok_or(TodoError::NotFound(id))?;

        info!(
            user_id = %auth.user_id,
            todo_id = %id,
            completed = todo.completed,
            "Todo toggled"
        );
        self.publish(auth, id, ChangeKind::Toggled);
        Ok(todo)
    }

    /// Applies a partial update
    ///
    /// An update that changes nothing performs no write and returns the
    /// stored record.
    pub async fn update_todo(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: UpdateTodo,
    ) -> Result<Todo, TodoError> {
        let existing = self.load_owned(auth, id).await?;
        let patch = input.into_patch()?;

        if patch.is_empty() {
            debug!(user_id = %auth.user_id, todo_id = %id, "Empty update, nothing to write");
            return Ok(existing);
        }

        let todo = self
            .store
            .apply_patch(id, auth.user_id, patch)
            .await
            .map_err(|e| store_failure(e, auth, "update todo"))?
            .ok_or(TodoError::NotFound(id))?;

        info!(user_id = %auth.user_id, todo_id = %id, "Todo updated");
        self.publish(auth, id, ChangeKind::Updated);
        Ok(todo)
    }

    /// Permanently removes a todo
    pub async fn delete_todo(&self, auth: &AuthContext, id: Uuid) -> Result<(), TodoError> {
        self.load_owned(auth, id).await?;

        let deleted = self
            .store
            .delete(id, auth.user_id)
            .await
            .map_err(|e| store_failure(e, auth, "delete todo"))?;
        if !deleted {
            return Err(TodoError::NotFound(id));
        }

        info!(user_id = %auth.user_id, todo_id = %id, "Todo deleted");
        self.publish(auth, id, ChangeKind::Deleted);
        Ok(())
    }

    /// Summary counts over the caller's todos
    pub async fn todo_stats(&self, auth: &AuthContext) -> Result<TodoStats, TodoError> {
        let todos = self.list_todos(auth).await?;
        Ok(TodoStats::from_todos(&todos))
    }

    /// List and stats together
    pub async fn snapshot(&self, auth: &AuthContext) -> Result<TodoSnapshot, TodoError> {
        let todos = self.list_todos(auth).await?;
        let stats = TodoStats::from_todos(&todos);
        Ok(TodoSnapshot { todos, stats })
    }

    /// Subscribes to the caller's changes
    pub fn subscribe(&self, auth: &AuthContext) -> ChangeSubscription {
        debug!(user_id = %auth.user_id, "Change subscription opened");
        self.hub.subscribe(auth.user_id)
    }

    async fn load_owned(&self, auth: &AuthContext, id: Uuid) -> Result<Todo, TodoError> {
        let todo = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| store_failure(e, auth, "load todo"))?;

        require_owned_todo(todo, id, auth).map_err(|e| {
            warn!(user_id = %auth.user_id, todo_id = %id, reason = %e, "Todo access rejected");
            TodoError::from(e)
        })
    }

    fn publish(&self, auth: &AuthContext, id: Uuid, kind: ChangeKind) {
        let receivers = self.hub.publish(TodoChange::new(auth.user_id, id, kind));
        debug!(user_id = %auth.user_id, todo_id = %id, ?kind, receivers, "Change published");
    }
}

fn store_failure(err: StoreError, auth: &AuthContext, action: &str) -> TodoError {
    error!(user_id = %auth.user_id, error = %err, "Failed to {}", action);
    TodoError::Store(err)
}
