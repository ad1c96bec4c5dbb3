/// API route handlers
///
/// - `health`: Health check endpoint
/// - `todos`: Todo operations (list, create, toggle, update, delete, stats)
/// - `stream`: Server-Sent Events feed of list and stats snapshots

pub mod health;
pub mod stream;
pub mod todos;
