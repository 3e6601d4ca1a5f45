use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Open Food Facts product lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductApiConfig {
    pub base_url: String,
}

/// Edamam recipe search.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeApiConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_key: String,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpClientConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub cache_url: String,
    pub jwt: JwtConfig,
    pub products: ProductApiConfig,
    pub recipes: RecipeApiConfig,
    pub http: HttpClientConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let cache_url = std::env::var("CACHE_URL")
            .unwrap_or_else(|_| "sqlite://nutriscan-cache.db?mode=rwc".into());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutriscan".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutriscan-users".into()),
        };
        let products = ProductApiConfig {
            base_url: std::env::var("PRODUCT_API_BASE")
                .unwrap_or_else(|_| "https://world.openfoodfacts.net/api/v2".into()),
        };
        let recipes = RecipeApiConfig {
            base_url: std::env::var("RECIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.edamam.com/api".into()),
            app_id: std::env::var("RECIPE_APP_ID").unwrap_or_default(),
            app_key: std::env::var("RECIPE_APP_KEY").unwrap_or_default(),
            limit: std::env::var("RECIPE_LIMIT")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(5),
        };
        let http = HttpClientConfig {
            timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(15),
            user_agent: std::env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| format!("nutriscan/{}", env!("CARGO_PKG_VERSION"))),
        };
        Ok(Self {
            database_url,
            cache_url,
            jwt,
            products,
            recipes,
            http,
        })
    }
}
