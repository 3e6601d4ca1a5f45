use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::{stream, Stream};
use tracing::{instrument, warn};

use super::HistoryEntry;
use crate::error::SyncError;
use crate::session::Session;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history))
        .route("/history/stream", get(stream_history))
        .route("/history/resync", post(resync_history))
}

pub async fn list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.sync.cache().snapshot().as_ref().clone())
}

/// Server-sent `history` events: the current snapshot, then one per resync.
pub async fn stream_history(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.sync.cache().observe();
    let events = stream::unfold(subscription, |mut sub| async move {
        let snapshot = sub.next().await?;
        let event = Event::default()
            .event("history")
            .json_data(snapshot.as_ref())
            .unwrap_or_else(|e| {
                warn!(error = %e, "encoding history snapshot failed");
                Event::default().comment("encoding failed")
            });
        Some((Ok(event), sub))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

#[instrument(skip(state, session))]
pub async fn resync_history(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<HistoryEntry>>, SyncError> {
    let snapshot = state.sync.resync(&session).await?;
    Ok(Json(snapshot.as_ref().clone()))
}
