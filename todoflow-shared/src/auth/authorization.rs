/// Ownership guard
///
/// Todos have exactly one owner, and only that owner may read or mutate
/// them. Every mutating operation loads the record and passes it through
/// [`require_owned_todo`] before touching the store.
///
/// The guard is pure: it never performs I/O and never logs.
///
/// # Example
///
/// ```
/// use todoflow_shared::auth::authorization::{require_owned_todo, AuthzError};
/// use todoflow_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// let auth = AuthContext::new(Uuid::new_v4());
/// let missing = Uuid::new_v4();
///
/// let result = require_owned_todo(None, missing, &auth);
/// assert!(matches!(result, Err(AuthzError::NotFound(id)) if id == missing));
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::todo::Todo;

/// Error type for authorization checks
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// No record with this ID exists
    #[error("Todo {0} not found")]
    NotFound(Uuid),

    /// Record exists but belongs to someone else
    #[error("Not authorized to access this resource")]
    NotOwner,
}

/// Checks if the caller owns a resource
pub fn require_ownership(auth: &AuthContext, resource_owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id != resource_owner_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

/// Checks that a looked-up todo exists and belongs to the caller
///
/// # Errors
///
/// - `AuthzError::NotFound` if `todo` is `None`
/// - `AuthzError::NotOwner` if the todo belongs to another user
pub fn require_owned_todo(
    todo: Option<Todo>,
    id: Uuid,
    auth: &AuthContext,
) -> Result<Todo, AuthzError> {
    let todo = todo.ok_or(AuthzError::NotFound(id))?;
    require_ownership(auth, todo.owner_id)?;
    Ok(todo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::todo::Priority;
    use chrono::Utc;

    fn todo_owned_by(owner_id: Uuid) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            owner_id,
            title: "Water plants".to_string(),
            description: None,
            completed: false,
            priority: Priority::Low,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_require_ownership() {
        let user_id = Uuid::new_v4();
        let auth = AuthContext::new(user_id);

        assert!(require_ownership(&auth, user_id).is_ok());
        assert_eq!(
            require_ownership(&auth, Uuid::new_v4()),
            Err(AuthzError::NotOwner)
        );
    }

    #[test]
    fn test_require_owned_todo() {
        let owner = AuthContext::new(Uuid::new_v4());
        let stranger = AuthContext::new(Uuid::new_v4());
        let todo = todo_owned_by(owner.user_id);
        let id = todo.id;

        assert_eq!(
            require_owned_todo(Some(todo.clone()), id, &owner),
            Ok(todo.clone())
        );
        assert_eq!(
            require_owned_todo(Some(todo), id, &stranger),
            Err(AuthzError::NotOwner)
        );
        assert_eq!(
            require_owned_todo(None, id, &owner),
            Err(AuthzError::NotFound(id))
        );
    }

    #[test]
    fn test_authz_error_display() {
        let id = Uuid::nil();
        assert!(AuthzError::NotFound(id).to_string().contains("not found"));
        assert!(AuthzError::NotOwner.to_string().contains("Not authorized"));
    }
}
