/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todoflow_api::{app::{build_router, AppState}, config::Config};
/// use todoflow_shared::{events::ChangeHub, service::TodoService, store::InMemoryTodoStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let service = TodoService::new(Arc::new(InMemoryTodoStore::new()), ChangeHub::default());
/// let app = build_router(AppState::new(service, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use todoflow_shared::{
    auth::middleware::authenticate_headers,
    service::{TodoError, TodoService},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,

    pub config: Arc<Config>,

    /// Cancelled on server shutdown; ends open change streams
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(service: TodoService, config: Config) -> Self {
        Self {
            service,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// Gets shutdown token
    ///
    /// Cancel it before (or while) draining connections so long-lived
    /// streams let the server finish.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Secret used to verify session tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                     # Health check (public)
/// └── /v1/todos                       # Bearer token required
///     ├── GET    /                    # List (search/status/priority query)
///     ├── POST   /                    # Create
///     ├── GET    /stats               # Summary counts
///     ├── GET    /stream              # SSE snapshots
///     ├── PATCH  /:id                 # Partial update
///     ├── DELETE /:id                 # Delete
///     └── POST   /:id/toggle          # Flip completed
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let todo_routes = Router::new()
        .route(
            "/",
            get(routes::todos::list_todos).post(routes::todos::create_todo),
        )
        .route("/stats", get(routes::todos::todo_stats))
        .route("/stream", get(routes::stream::stream_todos))
        .route(
            "/:id",
            patch(routes::todos::update_todo).delete(routes::todos::delete_todo),
        )
        .route("/:id/toggle", post(routes::todos::toggle_todo))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().nest("/todos", todo_routes);

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Resolves the caller from the bearer token and stores the
/// `AuthContext` in the request extensions
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate_headers(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected unauthenticated request");
        ApiError::from(TodoError::from(e))
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
