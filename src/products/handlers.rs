use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::model::Product;
use crate::error::SyncError;
use crate::session::Session;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/products/:barcode", get(get_product))
}

/// Looks the product up and records it before answering.
#[instrument(skip(state, session))]
pub async fn get_product(
    State(state): State<AppState>,
    session: Session,
    Path(barcode): Path<String>,
) -> Result<Json<Product>, SyncError> {
    let product = state.sync.lookup_and_record(&session, &barcode).await?;
    Ok(Json(product))
}
