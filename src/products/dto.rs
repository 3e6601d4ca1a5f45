use serde::{Deserialize, Deserializer};

use super::model::{Grade, Nutriments, Product};

/// Body of `GET /product/{barcode}` on the Open Food Facts v2 API.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub status_verbose: Option<String>,
    #[serde(default)]
    pub product: Option<ProductPayload>,
}

impl ProductResponse {
    /// `None` when the payload says the product does not exist.
    pub fn into_product(self) -> Option<Product> {
        if self.status == Some(0) {
            return None;
        }
        self.product.map(Product::from)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    #[serde(default)]
    pub nutriments: Option<NutrimentsPayload>,
    pub nutriscore_grade: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub nutriscore_score: Option<f64>,
    pub categories: Option<String>,
    #[serde(default)]
    pub allergens_tags: Option<Vec<String>>,
    pub countries: Option<String>,
    pub quantity: Option<String>,
    pub ecoscore_grade: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NutrimentsPayload {
    #[serde(
        default,
        rename = "energy-kcal_100g",
        alias = "energy_kcal_100g",
        deserialize_with = "lenient_f64"
    )]
    pub energy_kcal_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fat_100g: Option<f64>,
    #[serde(
        default,
        rename = "saturated-fat_100g",
        alias = "saturated_fat_100g",
        deserialize_with = "lenient_f64"
    )]
    pub saturated_fat_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sugars_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fiber_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub proteins_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub salt_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sodium_100g: Option<f64>,
}

impl From<NutrimentsPayload> for Nutriments {
    fn from(n: NutrimentsPayload) -> Self {
        Self {
            energy_kcal_100g: n.energy_kcal_100g,
            fat_100g: n.fat_100g,
            saturated_fat_100g: n.saturated_fat_100g,
            sugars_100g: n.sugars_100g,
            carbohydrates_100g: n.carbohydrates_100g,
            fiber_100g: n.fiber_100g,
            proteins_100g: n.proteins_100g,
            salt_100g: n.salt_100g,
            sodium_100g: n.sodium_100g,
        }
    }
}

impl From<ProductPayload> for Product {
    fn from(p: ProductPayload) -> Self {
        Self {
            product_name: p.product_name,
            brands: p.brands,
            image_url: p.image_url,
            ingredients_text: p.ingredients_text,
            nutriments: p.nutriments.map(Nutriments::from).unwrap_or_default(),
            nutriscore_grade: Grade::parse_lenient(p.nutriscore_grade.as_deref()),
            nutriscore_score: p.nutriscore_score.map(|s| s.round() as i32),
            categories: p.categories,
            allergens_tags: p.allergens_tags.unwrap_or_default(),
            countries: p.countries,
            quantity: p.quantity,
            ecoscore_grade: Grade::parse_lenient(p.ecoscore_grade.as_deref()),
        }
    }
}

// Open Food Facts occasionally sends numbers as strings ("0.5").
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
