use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::state::{LookupResult, LookupState};
use crate::products::model::Product;
use crate::session::Session;
use crate::suggestions::{Suggestion, SuggestionFetcher};
use crate::sync::ProductSync;

/// One product lookup and one suggestion lookup, each observable by the UI.
pub struct Lookups {
    sync: Arc<ProductSync>,
    suggestions: Arc<dyn SuggestionFetcher>,
    product_state: LookupState<Product>,
    suggestion_state: LookupState<Vec<Suggestion>>,
}

impl Lookups {
    pub fn new(sync: Arc<ProductSync>, suggestions: Arc<dyn SuggestionFetcher>) -> Self {
        Self {
            sync,
            suggestions,
            product_state: LookupState::new(),
            suggestion_state: LookupState::new(),
        }
    }

    /// State is `Loading` when this returns; the pipeline runs on a spawned task.
    pub fn start_product_lookup(
        self: &Arc<Self>,
        session: Session,
        barcode: String,
    ) -> JoinHandle<()> {
        let ticket = self.product_state.begin();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = this.sync.lookup_and_record(&session, &barcode).await;
            if let Err(e) = &outcome {
                error!(error = %e, %barcode, "product lookup failed");
            }
            if !this.product_state.finish(ticket, outcome) {
                debug!(%barcode, "superseded product lookup finished");
            }
        })
    }

    pub fn start_suggestion_lookup(self: &Arc<Self>, query: String) -> JoinHandle<()> {
        let ticket = self.suggestion_state.begin();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = this.suggestions.suggest(&query).await;
            if let Err(e) = &outcome {
                error!(error = %e, %query, "suggestion lookup failed");
            }
            if !this.suggestion_state.finish(ticket, outcome) {
                debug!(%query, "superseded suggestion lookup finished");
            }
        })
    }

    pub fn product_result(&self) -> LookupResult<Product> {
        self.product_state.current()
    }

    pub fn suggestion_result(&self) -> LookupResult<Vec<Suggestion>> {
        self.suggestion_state.current()
    }

    pub fn subscribe_product(&self) -> watch::Receiver<LookupResult<Product>> {
        self.product_state.subscribe()
    }

    pub fn subscribe_suggestions(&self) -> watch::Receiver<LookupResult<Vec<Suggestion>>> {
        self.suggestion_state.subscribe()
    }
}
