//! # TodoFlow API Server
//!
//! Personal todo backend: list, create, toggle, update, delete and stats
//! over HTTP/JSON, plus a Server-Sent Events feed of list snapshots.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=... DATABASE_URL=postgresql://... cargo run -p todoflow-api
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use todoflow_api::{
    app::{build_router, AppState},
    config::Config,
};
use todoflow_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, PoolConfig},
    },
    events::ChangeHub,
    service::TodoService,
    store::{InMemoryTodoStore, PgTodoStore, TodoStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todoflow_api=debug,todoflow_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TodoFlow API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pg_store = match &config.database {
        Some(database) => {
            if database.auto_migrate {
                ensure_database_exists(&database.url).await?;
            }

            let pool = create_pool(PoolConfig {
                url: database.url.clone(),
                max_connections: database.max_connections,
                ..Default::default()
            })
            .await?;

            if database.auto_migrate {
                run_migrations(&pool).await?;
            }

            Some(PgTodoStore::new(pool))
        }
        None => None,
    };

    let store: Arc<dyn TodoStore> = match &pg_store {
        Some(store) => Arc::new(store.clone()),
        None => {
            tracing::warn!("DATABASE_URL not set, todos are kept in memory and lost on restart");
            Arc::new(InMemoryTodoStore::new())
        }
    };

    let service = TodoService::new(store, ChangeHub::new(config.events.channel_capacity));
    let bind_address = config.bind_address();
    let state = AppState::new(service, config);
    let shutdown = state.shutdown_token();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    if let Some(store) = pg_store {
        close_pool(store.pool().clone()).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Waits for Ctrl-C, then cancels `shutdown` so open streams end
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
    shutdown.cancel();
}
