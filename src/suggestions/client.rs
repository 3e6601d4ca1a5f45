use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::dto::{RecipeSearchResponse, Suggestion};
use crate::config::{HttpClientConfig, RecipeApiConfig};

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("recipe service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Advisory recipe lookup; never part of the product pipeline.
#[async_trait]
pub trait SuggestionFetcher: Send + Sync {
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionError>;
}

#[derive(Clone)]
pub struct Edamam {
    client: Client,
    base_url: String,
    app_id: String,
    app_key: String,
    limit: usize,
}

impl Edamam {
    pub fn new(api: &RecipeApiConfig, http: &HttpClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(http.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            app_id: api.app_id.clone(),
            app_key: api.app_key.clone(),
            limit: api.limit,
        })
    }
}

#[async_trait]
impl SuggestionFetcher for Edamam {
    #[instrument(skip(self))]
    async fn suggest(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionError> {
        let to = self.limit.to_string();
        let res: RecipeSearchResponse = self
            .client
            .get(format!("{}/recipes/v2", self.base_url))
            .query(&[
                ("type", "public"),
                ("q", query),
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
                ("from", "0"),
                ("to", to.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(hits = res.hits.len(), "recipe search response");
        Ok(res
            .hits
            .into_iter()
            .take(self.limit)
            .map(|h| Suggestion::from(h.recipe))
            .collect())
    }
}
