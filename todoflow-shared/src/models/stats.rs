/// Todo statistics snapshot
///
/// A derived, never-persisted aggregate recomputed from the full list of a
/// user's todos on every request.

use serde::{Deserialize, Serialize};

use super::todo::{Priority, Todo};

/// Summary counts over one user's todos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    /// Number of todos
    pub total: usize,

    /// Number of completed todos
    pub completed: usize,

    /// Number of open todos (`total - completed`)
    pub pending: usize,

    /// Number of open todos with high priority
    pub high_priority: usize,
}

impl TodoStats {
    /// Reduces a list of todos to its summary counts
    pub fn from_todos(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|todo| todo.completed).count();
        let high_priority = todos
            .iter()
            .filter(|todo| todo.priority == Priority::High && !todo.completed)
            .count();

        Self {
            total,
            completed,
            pending: total - completed,
            high_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn todo(priority: Priority, completed: bool) -> Todo {
        let now = Utc::now();
        Todo {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            title: "task".to_string(),
            description: None,
            completed,
            priority,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_stats() {
        assert_eq!(TodoStats::from_todos(&[]), TodoStats::default());
    }

    #[test]
    fn test_high_priority_counts_only_open_todos() {
        let todos = vec![
            todo(Priority::High, false),
            todo(Priority::High, true),
            todo(Priority::Medium, false),
            todo(Priority::Low, true),
        ];

        let stats = TodoStats::from_todos(&todos);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.high_priority, 1);
        assert!(stats.high_priority <= stats.pending);
    }

    #[test]
    fn test_stats_serialization() {
        let stats = TodoStats {
            total: 3,
            completed: 1,
            pending: 2,
            high_priority: 1,
        };

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["total"], 3);
        assert_eq!(json["pending"], 2);
        assert_eq!(json["high_priority"], 1);
    }
}
