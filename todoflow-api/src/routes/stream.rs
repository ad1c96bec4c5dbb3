/// Live todo feed (Server-Sent Events)
///
/// ```text
/// GET /v1/todos/stream
/// ```
///
/// Sends a `snapshot` event with the caller's full list and stats right
/// away, then a fresh `snapshot` after every change to the caller's todos.
/// A keep-alive comment goes out every 25 seconds. The stream ends when the
/// server shuts down.
///
/// ```text
/// event: snapshot
/// data: {"todos":[...],"stats":{"total":2,"completed":1,"pending":1,"high_priority":0}}
/// ```
///
/// # Example
///
/// ```bash
/// curl -N -H "Authorization: Bearer <token>" http://localhost:8080/v1/todos/stream
/// ```

use crate::{app::AppState, error::ApiResult, routes::todos::TodoResponse};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use serde::Serialize;
use std::{convert::Infallible, time::Duration};
use todoflow_shared::{
    auth::middleware::AuthContext,
    events::ChangeSubscription,
    models::stats::TodoStats,
    service::{TodoService, TodoSnapshot},
};
use tokio_stream::StreamExt as _;
use tokio_util::sync::CancellationToken;

/// Keep-alive interval
const KEEP_ALIVE_SECS: u64 = 25;

/// Payload of a `snapshot` event
#[derive(Debug, Serialize)]
pub struct SnapshotData {
    pub todos: Vec<TodoResponse>,
    pub stats: TodoStats,
}

impl From<TodoSnapshot> for SnapshotData {
    fn from(snapshot: TodoSnapshot) -> Self {
        Self {
            todos: TodoResponse::from_list(snapshot.todos),
            stats: snapshot.stats,
        }
    }
}

pub async fn stream_todos(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    // Subscribe first so nothing between the initial read and the
    // subscription is missed
    let subscription = state.service.subscribe(&auth);
    let initial = state.service.snapshot(&auth).await?;

    tracing::info!(user_id = %auth.user_id, "Todo stream opened");

    let first = snapshot_event(initial.into());
    let updates = live_snapshots(
        state.service.clone(),
        auth,
        subscription,
        state.shutdown_token(),
    );
    let stream = stream::once(async move { Ok::<_, Infallible>(first) }).chain(updates);

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS))))
}

/// Re-reads list and stats after each change until shutdown or the hub
/// goes away
fn live_snapshots(
    service: TodoService,
    auth: AuthContext,
    subscription: ChangeSubscription,
    shutdown: CancellationToken,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(
        (service, auth, subscription, shutdown),
        |(service, auth, mut subscription, shutdown)| async move {
            let change = tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!(user_id = %auth.user_id, "Closing todo stream for shutdown");
                    return None;
                }
                change = subscription.next() => change?,
            };
            tracing::debug!(user_id = %auth.user_id, kind = ?change.kind, "Pushing snapshot");

            let event = match service.snapshot(&auth).await {
                Ok(snapshot) => snapshot_event(snapshot.into()),
                Err(e) => {
                    tracing::warn!(user_id = %auth.user_id, error = %e, "Snapshot failed");
                    Event::default().event("error").data("snapshot unavailable")
                }
            };

            Some((Ok(event), (service, auth, subscription, shutdown)))
        },
    )
}

fn snapshot_event(data: SnapshotData) -> Event {
    Event::default()
        .event("snapshot")
        .json_data(&data)
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize snapshot");
            Event::default().event("error").data("snapshot unavailable")
        })
}
