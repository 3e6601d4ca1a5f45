use serde::{Deserialize, Serialize};

/// Body of `GET /recipes/v2` on the Edamam API.
#[derive(Debug, Deserialize)]
pub struct RecipeSearchResponse {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    pub recipe: RecipeDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDto {
    pub uri: String,
    pub label: String,
    pub image: Option<String>,
    #[serde(default)]
    pub ingredient_lines: Vec<String>,
    #[serde(default)]
    pub calories: f64,
}

/// A recipe alternative shown next to a scanned product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub uri: String,
    pub image: Option<String>,
    pub calories: f64,
    pub ingredient_lines: Vec<String>,
}

impl From<RecipeDto> for Suggestion {
    fn from(r: RecipeDto) -> Self {
        Self {
            label: r.label,
            uri: r.uri,
            image: r.image,
            calories: r.calories,
            ingredient_lines: r.ingredient_lines,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default = "default_query")]
    pub query: String,
}

fn default_query() -> String {
    "healthy".into()
}
