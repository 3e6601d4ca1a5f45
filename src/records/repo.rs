use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::instrument;

use super::repo_types::StoredProductRow;
use crate::products::model::StoredProduct;
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("no signed-in user")]
    Unauthenticated,
    #[error("record store unavailable: {0}")]
    RemoteUnavailable(#[from] sqlx::Error),
}

/// Per-user remote history, one record per barcode.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes or overwrites the record for `barcode` in one statement.
    async fn upsert(
        &self,
        session: &Session,
        barcode: &str,
        record: &StoredProduct,
    ) -> Result<(), RecordStoreError>;

    /// Every record of the user. Order is not meaningful.
    async fn list_all(&self, session: &Session) -> Result<Vec<StoredProduct>, RecordStoreError>;
}

#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(skip(self, record))]
    async fn upsert(
        &self,
        session: &Session,
        barcode: &str,
        record: &StoredProduct,
    ) -> Result<(), RecordStoreError> {
        let user_id = session.user_id().ok_or(RecordStoreError::Unauthenticated)?;
        sqlx::query(
            r#"
            INSERT INTO user_products (
                user_id, barcode, product_name, brands, image_url, ingredients_text,
                nutriscore_grade, nutriscore_score, categories, countries, quantity,
                ecoscore_grade, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (user_id, barcode) DO UPDATE SET
                product_name = EXCLUDED.product_name,
                brands = EXCLUDED.brands,
                image_url = EXCLUDED.image_url,
                ingredients_text = EXCLUDED.ingredients_text,
                nutriscore_grade = EXCLUDED.nutriscore_grade,
                nutriscore_score = EXCLUDED.nutriscore_score,
                categories = EXCLUDED.categories,
                countries = EXCLUDED.countries,
                quantity = EXCLUDED.quantity,
                ecoscore_grade = EXCLUDED.ecoscore_grade,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(barcode)
        .bind(&record.product_name)
        .bind(&record.brands)
        .bind(&record.image_url)
        .bind(&record.ingredients_text)
        .bind(record.nutriscore_grade.map(|g| g.as_str()))
        .bind(record.nutriscore_score)
        .bind(&record.categories)
        .bind(&record.countries)
        .bind(&record.quantity)
        .bind(record.ecoscore_grade.map(|g| g.as_str()))
        .bind(OffsetDateTime::now_utc())
        .execute(&self.db)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_all(&self, session: &Session) -> Result<Vec<StoredProduct>, RecordStoreError> {
        let user_id = session.user_id().ok_or(RecordStoreError::Unauthenticated)?;
        let rows = sqlx::query_as::<_, StoredProductRow>(
            r#"
            SELECT product_name, brands, image_url, ingredients_text, nutriscore_grade,
                   nutriscore_score, categories, countries, quantity, ecoscore_grade
            FROM user_products
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(StoredProduct::from).collect())
    }
}
