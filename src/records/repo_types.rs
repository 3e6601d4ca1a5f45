use sqlx::FromRow;

use crate::products::model::{Grade, StoredProduct};

/// Row shape shared by the remote `user_products` table and the local `history` table.
#[derive(Debug, FromRow)]
pub struct StoredProductRow {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    pub nutriscore_grade: Option<String>,
    pub nutriscore_score: Option<i32>,
    pub categories: Option<String>,
    pub countries: Option<String>,
    pub quantity: Option<String>,
    pub ecoscore_grade: Option<String>,
}

impl From<StoredProductRow> for StoredProduct {
    fn from(r: StoredProductRow) -> Self {
        Self {
            product_name: r.product_name,
            brands: r.brands,
            image_url: r.image_url,
            ingredients_text: r.ingredients_text,
            nutriscore_grade: Grade::parse_lenient(r.nutriscore_grade.as_deref()),
            nutriscore_score: r.nutriscore_score,
            categories: r.categories,
            countries: r.countries,
            quantity: r.quantity,
            ecoscore_grade: Grade::parse_lenient(r.ecoscore_grade.as_deref()),
        }
    }
}
