/// Todo list filter
///
/// Combines a free-text search with status and priority selectors. All
/// three must match (AND) and the input order is preserved. The list
/// endpoint deserializes a [`TodoFilter`] straight from the query string.
///
/// # Example
///
/// ```
/// use todoflow_shared::filter::{StatusFilter, TodoFilter};
///
/// let filter = TodoFilter {
///     search: "milk".to_string(),
///     status: StatusFilter::Pending,
///     ..Default::default()
/// };
/// assert!(filter.is_active());
/// ```

use serde::{Deserialize, Serialize};

use crate::models::todo::{Priority, Todo};

/// Completion state selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }
}

/// Priority selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Low => todo.priority == Priority::Low,
            PriorityFilter::Medium => todo.priority == Priority::Medium,
            PriorityFilter::High => todo.priority == Priority::High,
        }
    }
}

impl From<Priority> for PriorityFilter {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Low => PriorityFilter::Low,
            Priority::Medium => PriorityFilter::Medium,
            Priority::High => PriorityFilter::High,
        }
    }
}

/// Search, status and priority filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoFilter {
    /// Case-insensitive substring of title or description; empty matches all
    pub search: String,

    pub status: StatusFilter,

    pub priority: PriorityFilter,
}

impl TodoFilter {
    /// True when any selector narrows the list
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || self.status != StatusFilter::All
            || self.priority != PriorityFilter::All
    }

    /// Checks one todo against all three selectors
    pub fn matches(&self, todo: &Todo) -> bool {
        self.matches_search(todo) && self.status.matches(todo) && self.priority.matches(todo)
    }

    /// Returns the matching todos in input order
    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }

    /// Owned variant of [`TodoFilter::apply`]
    pub fn apply_owned(&self, todos: Vec<Todo>) -> Vec<Todo> {
        todos.into_iter().filter(|todo| self.matches(todo)).collect()
    }

    fn matches_search(&self, todo: &Todo) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        todo.title.to_lowercase().contains(&needle)
            || todo
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle))
    }
}
