use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures::{stream, Stream};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::state::LookupResult;
use crate::products::model::Product;
use crate::session::Session;
use crate::state::AppState;
use crate::suggestions::dto::SuggestionQuery;
use crate::suggestions::Suggestion;

#[derive(Debug, Deserialize)]
pub struct ProductLookupRequest {
    pub barcode: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lookups/product",
            get(product_state).post(start_product_lookup),
        )
        .route(
            "/lookups/suggestions",
            get(suggestion_state).post(start_suggestion_lookup),
        )
        .route("/lookups/product/stream", get(stream_product_state))
        .route("/lookups/suggestions/stream", get(stream_suggestion_state))
}

#[instrument(skip(state, session))]
pub async fn start_product_lookup(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<ProductLookupRequest>,
) -> Result<(StatusCode, Json<LookupResult<Product>>), (StatusCode, String)> {
    let barcode = body.barcode.trim().to_string();
    if barcode.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "barcode is required".into()));
    }
    info!(%barcode, "product lookup requested");
    state.lookups.start_product_lookup(session, barcode);
    Ok((StatusCode::ACCEPTED, Json(LookupResult::Loading)))
}

pub async fn product_state(State(state): State<AppState>) -> Json<LookupResult<Product>> {
    Json(state.lookups.product_result())
}

#[instrument(skip(state))]
pub async fn start_suggestion_lookup(
    State(state): State<AppState>,
    Json(body): Json<SuggestionQuery>,
) -> (StatusCode, Json<LookupResult<Vec<Suggestion>>>) {
    state.lookups.start_suggestion_lookup(body.query);
    (StatusCode::ACCEPTED, Json(LookupResult::Loading))
}

pub async fn suggestion_state(
    State(state): State<AppState>,
) -> Json<LookupResult<Vec<Suggestion>>> {
    Json(state.lookups.suggestion_result())
}

pub async fn stream_product_state(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state_events(state.lookups.subscribe_product())
}

pub async fn stream_suggestion_state(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state_events(state.lookups.subscribe_suggestions())
}

/// `lookup` events: the current state first, then every transition.
fn state_events<T>(
    rx: watch::Receiver<LookupResult<T>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first {
            rx.changed().await.ok()?;
        }
        let current = rx.borrow_and_update().clone();
        let event = Event::default()
            .event("lookup")
            .json_data(&current)
            .unwrap_or_else(|e| {
                warn!(error = %e, "encoding lookup state failed");
                Event::default().comment("encoding failed")
            });
        Some((Ok(event), (rx, false)))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
