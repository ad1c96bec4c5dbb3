/// Database layer for TodoFlow
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations
///
/// The SQL for todos lives next to the model in `models::todo`.

pub mod migrations;
pub mod pool;
