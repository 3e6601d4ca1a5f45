use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::error::SyncError;
use crate::history::{HistoryCache, Snapshot};
use crate::products::gateway::ProductGateway;
use crate::products::model::{Product, StoredProduct};
use crate::records::RecordStore;
use crate::session::Session;

/// Fetch, persist remotely, rebuild the local history, in that order.
pub struct ProductSync {
    gateway: Arc<dyn ProductGateway>,
    records: Arc<dyn RecordStore>,
    cache: HistoryCache,
    resync_lock: Mutex<()>,
}

impl ProductSync {
    pub fn new(
        gateway: Arc<dyn ProductGateway>,
        records: Arc<dyn RecordStore>,
        cache: HistoryCache,
    ) -> Self {
        Self {
            gateway,
            records,
            cache,
            resync_lock: Mutex::new(()),
        }
    }

    pub fn cache(&self) -> &HistoryCache {
        &self.cache
    }

    /// The product is returned only after it is recorded remotely and the
    /// local history has been rebuilt from the remote store.
    #[instrument(skip(self, session))]
    pub async fn lookup_and_record(
        &self,
        session: &Session,
        barcode: &str,
    ) -> Result<Product, SyncError> {
        let product = self
            .gateway
            .fetch_product(barcode)
            .await?
            .ok_or_else(|| SyncError::ProductNotFound {
                barcode: barcode.to_string(),
            })?;

        self.records
            .upsert(session, barcode, &StoredProduct::from(&product))
            .await
            .map_err(|e| {
                warn!(error = %e, "recording product failed");
                SyncError::from_upsert(e)
            })?;

        self.resync(session).await?;

        info!(name = ?product.product_name, "product looked up and recorded");
        Ok(product)
    }

    /// Wipe-and-reload of the local history from the remote store.
    /// Concurrent calls run one after another.
    #[instrument(skip(self, session))]
    pub async fn resync(&self, session: &Session) -> Result<Snapshot, SyncError> {
        let _guard = self.resync_lock.lock().await;

        let records = self
            .records
            .list_all(session)
            .await
            .map_err(SyncError::from_listing)?;
        let snapshot = self.cache.replace_all(&records).await.map_err(|e| {
            warn!(error = %e, "replacing local history failed");
            SyncError::from(e)
        })?;

        info!(rows = snapshot.len(), "history resynced");
        Ok(snapshot)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use tokio::sync::Notify;
    use uuid::Uuid;

    use crate::products::gateway::{GatewayError, ProductGateway};
    use crate::products::model::{Grade, Nutriments, Product, StoredProduct};
    use crate::records::{RecordStore, RecordStoreError};
    use crate::session::Session;

    pub fn product(name: &str, brand: &str, grade: Option<Grade>) -> Product {
        Product {
            product_name: Some(name.into()),
            brands: Some(brand.into()),
            image_url: Some(format!("https://images.example/{name}.jpg")),
            ingredients_text: Some("cocoa, sugar".into()),
            nutriments: Nutriments {
                energy_kcal_100g: Some(530.0),
                ..Default::default()
            },
            nutriscore_grade: grade,
            nutriscore_score: Some(3),
            categories: Some("Snacks".into()),
            allergens_tags: vec!["en:milk".into()],
            countries: Some("France".into()),
            quantity: Some("100 g".into()),
            ecoscore_grade: None,
        }
    }

    pub enum Answer {
        Found(Product),
        NotFound,
        Offline,
    }

    /// Answers per barcode; barcodes listed in `gated` wait for `release`.
    #[derive(Default)]
    pub struct FakeGateway {
        answers: StdMutex<HashMap<String, Answer>>,
        gated: StdMutex<Vec<String>>,
        pub release: Notify,
    }

    impl FakeGateway {
        pub fn with(self, barcode: &str, answer: Answer) -> Self {
            self.answers
                .lock()
                .unwrap()
                .insert(barcode.to_string(), answer);
            self
        }

        pub fn gate(self, barcode: &str) -> Self {
            self.gated.lock().unwrap().push(barcode.to_string());
            self
        }
    }

    #[async_trait]
    impl ProductGateway for FakeGateway {
        async fn fetch_product(&self, barcode: &str) -> Result<Option<Product>, GatewayError> {
            let gated = self.gated.lock().unwrap().iter().any(|b| b == barcode);
            if gated {
                self.release.notified().await;
            }
            match self.answers.lock().unwrap().get(barcode) {
                Some(Answer::Found(p)) => Ok(Some(p.clone())),
                Some(Answer::NotFound) | None => Ok(None),
                Some(Answer::Offline) => {
                    Err(GatewayError::Transport("network is unreachable".into()))
                }
            }
        }
    }

    #[derive(Default)]
    pub struct MemoryRecords {
        rows: StdMutex<HashMap<Uuid, BTreeMap<String, StoredProduct>>>,
        fail_upsert: bool,
        fail_list: bool,
    }

    impl MemoryRecords {
        pub fn failing_upsert() -> Self {
            Self {
                fail_upsert: true,
                ..Default::default()
            }
        }

        pub fn failing_list() -> Self {
            Self {
                fail_list: true,
                ..Default::default()
            }
        }

        pub fn seed(&self, user: Uuid, barcode: &str, record: StoredProduct) {
            self.rows
                .lock()
                .unwrap()
                .entry(user)
                .or_default()
                .insert(barcode.to_string(), record);
        }

        pub fn count(&self, user: Uuid) -> usize {
            self.rows
                .lock()
                .unwrap()
                .get(&user)
                .map(|m| m.len())
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl RecordStore for MemoryRecords {
        async fn upsert(
            &self,
            session: &Session,
            barcode: &str,
            record: &StoredProduct,
        ) -> Result<(), RecordStoreError> {
            let user = session.user_id().ok_or(RecordStoreError::Unauthenticated)?;
            if self.fail_upsert {
                return Err(RecordStoreError::RemoteUnavailable(sqlx::Error::PoolTimedOut));
            }
            self.seed(user, barcode, record.clone());
            Ok(())
        }

        async fn list_all(
            &self,
            session: &Session,
        ) -> Result<Vec<StoredProduct>, RecordStoreError> {
            let user = session.user_id().ok_or(RecordStoreError::Unauthenticated)?;
            if self.fail_list {
                return Err(RecordStoreError::RemoteUnavailable(sqlx::Error::PoolTimedOut));
            }
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&user)
                .map(|m| m.values().cloned().collect())
                .unwrap_or_default())
        }
    }
}
