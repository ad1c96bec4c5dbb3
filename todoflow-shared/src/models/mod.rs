/// Domain models for TodoFlow
///
/// # Models
///
/// - `todo`: Todo records and their PostgreSQL operations
/// - `stats`: Derived summary counts over a user's todos

pub mod stats;
pub mod todo;

pub use stats::TodoStats;
pub use todo::{FieldUpdate, NewTodo, Priority, Todo, TodoPatch};
