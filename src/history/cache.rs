use std::sync::Arc;

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite};
use tokio::sync::{watch, Mutex};
use tracing::{debug, instrument};

use crate::products::model::StoredProduct;
use crate::records::StoredProductRow;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("local cache error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("local cache migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// One row of the history view. `id` is local and regenerated on every replace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    #[serde(flatten)]
    pub product: StoredProduct,
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i64,
    #[sqlx(flatten)]
    product: StoredProductRow,
}

impl From<HistoryRow> for HistoryEntry {
    fn from(r: HistoryRow) -> Self {
        Self {
            id: r.id,
            product: r.product.into(),
        }
    }
}

pub type Snapshot = Arc<Vec<HistoryEntry>>;

/// On-device mirror of the user's records.
///
/// Only [`HistoryCache::replace_all`] writes. Subscribers see whole snapshots,
/// published after the replacing transaction commits.
#[derive(Clone)]
pub struct HistoryCache {
    db: SqlitePool,
    snapshots: Arc<watch::Sender<Snapshot>>,
    write_lock: Arc<Mutex<()>>,
}

impl HistoryCache {
    pub async fn open(url: &str) -> Result<Self, CacheError> {
        let options: SqliteConnectOptions = url.parse()?;
        // A single connection keeps `sqlite::memory:` databases shared.
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options.create_if_missing(true))
            .await?;
        sqlx::migrate!("./migrations/cache").run(&db).await?;

        let initial = load(&db).await?;
        let (tx, _) = watch::channel(Arc::new(initial));
        Ok(Self {
            db,
            snapshots: Arc::new(tx),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Clears the table and inserts `records` in one transaction, then publishes.
    #[instrument(skip_all, fields(count = records.len()))]
    pub async fn replace_all(&self, records: &[StoredProduct]) -> Result<Snapshot, CacheError> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM history").execute(&mut *tx).await?;
        for r in records {
            sqlx::query(
                r#"
                INSERT INTO history (
                    product_name, brands, image_url, ingredients_text, nutriscore_grade,
                    nutriscore_score, categories, countries, quantity, ecoscore_grade
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&r.product_name)
            .bind(&r.brands)
            .bind(&r.image_url)
            .bind(&r.ingredients_text)
            .bind(r.nutriscore_grade.map(|g| g.as_str()))
            .bind(r.nutriscore_score)
            .bind(&r.categories)
            .bind(&r.countries)
            .bind(&r.quantity)
            .bind(r.ecoscore_grade.map(|g| g.as_str()))
            .execute(&mut *tx)
            .await?;
        }
        // Read back inside the transaction so a failed read rolls the replace back.
        let snapshot = Arc::new(load(&mut *tx).await?);
        tx.commit().await?;

        self.snapshots.send_replace(snapshot.clone());
        debug!(rows = snapshot.len(), "history replaced");
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn observe(&self) -> HistorySubscription {
        HistorySubscription {
            rx: self.snapshots.subscribe(),
            primed: false,
        }
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.db.close().await;
    }
}

/// Yields the current snapshot first, then one per later replace.
/// A slow reader skips intermediate snapshots but never sees a partial one.
pub struct HistorySubscription {
    rx: watch::Receiver<Snapshot>,
    primed: bool,
}

impl HistorySubscription {
    /// `None` once the cache has been dropped.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

async fn load<'e, E>(db: E) -> Result<Vec<HistoryEntry>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, HistoryRow>(
        r#"
        SELECT id, product_name, brands, image_url, ingredients_text, nutriscore_grade,
               nutriscore_score, categories, countries, quantity, ecoscore_grade
        FROM history
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(HistoryEntry::from).collect())
}
