use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::history::CacheError;
use crate::products::gateway::GatewayError;
use crate::records::RecordStoreError;

/// Failure of a lookup-and-record or resync call. Each kind stays distinguishable
/// so callers can tell "no product" from "no network" from "stale history".
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Product not found")]
    ProductNotFound { barcode: String },

    #[error("{0}")]
    Transport(String),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("Could not save product to history: {0}")]
    PersistenceFailed(#[source] RecordStoreError),

    #[error("History service unavailable: {0}")]
    RemoteUnavailable(#[source] RecordStoreError),

    #[error("History may be out of date: {0}")]
    Storage(#[from] CacheError),
}

impl From<GatewayError> for SyncError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Transport(msg) => SyncError::Transport(msg),
        }
    }
}

impl SyncError {
    /// Upsert failures: missing identity stays `Unauthenticated`, the rest is persistence.
    pub fn from_upsert(e: RecordStoreError) -> Self {
        match e {
            RecordStoreError::Unauthenticated => SyncError::Unauthenticated,
            other => SyncError::PersistenceFailed(other),
        }
    }

    /// Listing failures during a resync.
    pub fn from_listing(e: RecordStoreError) -> Self {
        match e {
            RecordStoreError::Unauthenticated => SyncError::Unauthenticated,
            other => SyncError::RemoteUnavailable(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SyncError::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            SyncError::Transport(_) => StatusCode::BAD_GATEWAY,
            SyncError::Unauthenticated => StatusCode::UNAUTHORIZED,
            SyncError::PersistenceFailed(_) | SyncError::RemoteUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            SyncError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
