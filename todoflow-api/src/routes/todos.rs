/// Todo endpoints
///
/// All routes require a bearer session token; the auth layer puts the
/// caller's `AuthContext` into the request extensions.
///
/// ```text
/// GET    /v1/todos?search=&status=&priority=
/// POST   /v1/todos
/// GET    /v1/todos/stats
/// PATCH  /v1/todos/:id
/// DELETE /v1/todos/:id
/// POST   /v1/todos/:id/toggle
/// ```
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/v1/todos \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"title": "Buy milk", "priority": "low"}'
/// ```

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiPath, ApiQuery},
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use todoflow_shared::{
    auth::middleware::AuthContext,
    filter::TodoFilter,
    models::{stats::TodoStats, todo::Todo},
    service::{CreateTodo, UpdateTodo},
};
use uuid::Uuid;

/// Todo as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct TodoResponse {
    #[serde(flatten)]
    pub todo: Todo,

    /// Due date has passed and the todo is still open
    pub overdue: bool,
}

impl TodoResponse {
    pub fn new(todo: Todo, now_ms: i64) -> Self {
        let overdue = todo.is_overdue(now_ms);
        Self { todo, overdue }
    }

    /// Wraps a list, evaluating `overdue` against one clock reading
    pub fn from_list(todos: Vec<Todo>) -> Vec<Self> {
        let now_ms = Utc::now().timestamp_millis();
        todos
            .into_iter()
            .map(|todo| Self::new(todo, now_ms))
            .collect()
    }
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        Self::new(todo, Utc::now().timestamp_millis())
    }
}

/// Create response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTodoResponse {
    pub id: Uuid,
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTodoResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Lists the caller's todos, newest first, narrowed by the query filters
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(filter): ApiQuery<TodoFilter>,
) -> ApiResult<Json<Vec<TodoResponse>>> {
    let todos = state.service.list_todos(&auth).await?;

    let todos = if filter.is_active() {
        let matched = filter.apply_owned(todos);
        tracing::debug!(user_id = %auth.user_id, matched = matched.len(), "Applied list filter");
        matched
    } else {
        todos
    };

    Ok(Json(TodoResponse::from_list(todos)))
}

/// Creates a todo
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `422 Unprocessable Entity`: Blank title or field too long
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTodo>,
) -> ApiResult<(StatusCode, Json<CreateTodoResponse>)> {
    let id = state.service.create_todo(&auth, req).await?;

    Ok((StatusCode::CREATED, Json(CreateTodoResponse { id })))
}

/// Flips the completed flag
///
/// # Errors
///
/// - `403 Forbidden`: Todo belongs to another user
/// - `404 Not Found`: No such todo
pub async fn toggle_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.service.toggle_todo(&auth, id).await?;

    Ok(Json(todo.into()))
}

/// Applies a partial update
///
/// Omitted fields stay as they are. Use `clear_description` or
/// `clear_due_date` to remove those values.
///
/// # Errors
///
/// - `403 Forbidden`: Todo belongs to another user
/// - `404 Not Found`: No such todo
/// - `422 Unprocessable Entity`: Invalid field values
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    Json(req): Json<UpdateTodo>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.service.update_todo(&auth, id, req).await?;

    Ok(Json(todo.into()))
}

/// Permanently deletes a todo
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<DeleteTodoResponse>> {
    state.service.delete_todo(&auth, id).await?;

    Ok(Json(DeleteTodoResponse { id, deleted: true }))
}

/// Summary counts over the caller's todos
pub async fn todo_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TodoStats>> {
    let stats = state.service.todo_stats(&auth).await?;

    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoflow_shared::models::todo::Priority;

    #[test]
    fn test_todo_response_flattens_fields() {
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Pay rent".to_string(),
            description: None,
            completed: false,
            priority: Priority::High,
            due_date: Some(1_000),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(TodoResponse::new(todo.clone(), 2_000)).unwrap();
        assert_eq!(json["title"], "Pay rent");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["completed"], false);
        assert_eq!(json["overdue"], true);

        let json = serde_json::to_value(TodoResponse::new(todo, 500)).unwrap();
        assert_eq!(json["overdue"], false);
    }
}
