use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Nutri-Score / Eco-Score letter. `A` is best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "a",
            Grade::B => "b",
            Grade::C => "c",
            Grade::D => "d",
            Grade::E => "e",
        }
    }

    /// Lenient parse used for upstream and stored values: anything that is
    /// not a single `a`..`e` letter ("unknown", "not-applicable", "") is no grade.
    pub fn parse_lenient(raw: Option<&str>) -> Option<Grade> {
        raw.and_then(|s| s.trim().parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid grade: {0:?}")]
pub struct InvalidGrade(pub String);

impl FromStr for Grade {
    type Err = InvalidGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(Grade::A),
            "b" => Ok(Grade::B),
            "c" => Ok(Grade::C),
            "d" => Ok(Grade::D),
            "e" => Ok(Grade::E),
            _ => Err(InvalidGrade(s.to_string())),
        }
    }
}

/// Per-100g values. `None` means "not reported"; zero-filling is left to whoever renders it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutriments {
    pub energy_kcal_100g: Option<f64>,
    pub fat_100g: Option<f64>,
    pub saturated_fat_100g: Option<f64>,
    pub sugars_100g: Option<f64>,
    pub carbohydrates_100g: Option<f64>,
    pub fiber_100g: Option<f64>,
    pub proteins_100g: Option<f64>,
    pub salt_100g: Option<f64>,
    pub sodium_100g: Option<f64>,
}

/// Canonical product as returned by a lookup. The barcode is the record key, not a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    pub nutriments: Nutriments,
    pub nutriscore_grade: Option<Grade>,
    pub nutriscore_score: Option<i32>,
    pub categories: Option<String>,
    pub allergens_tags: Vec<String>,
    pub countries: Option<String>,
    pub quantity: Option<String>,
    pub ecoscore_grade: Option<Grade>,
}

/// History projection of a [`Product`]: allergens and nutriments are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub product_name: Option<String>,
    pub brands: Option<String>,
    pub image_url: Option<String>,
    pub ingredients_text: Option<String>,
    pub nutriscore_grade: Option<Grade>,
    pub nutriscore_score: Option<i32>,
    pub categories: Option<String>,
    pub countries: Option<String>,
    pub quantity: Option<String>,
    pub ecoscore_grade: Option<Grade>,
}

impl From<&Product> for StoredProduct {
    fn from(p: &Product) -> Self {
        Self {
            product_name: p.product_name.clone(),
            brands: p.brands.clone(),
            image_url: p.image_url.clone(),
            ingredients_text: p.ingredients_text.clone(),
            nutriscore_grade: p.nutriscore_grade,
            nutriscore_score: p.nutriscore_score,
            categories: p.categories.clone(),
            countries: p.countries.clone(),
            quantity: p.quantity.clone(),
            ecoscore_grade: p.ecoscore_grade,
        }
    }
}
