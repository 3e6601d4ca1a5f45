use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument, warn};

use super::dto::ProductResponse;
use super::model::Product;
use crate::config::{HttpClientConfig, ProductApiConfig};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("product service request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

/// Read-only access to the external product database.
/// `Ok(None)` is the "no such product" answer; only transport problems are errors.
#[async_trait]
pub trait ProductGateway: Send + Sync {
    async fn fetch_product(&self, barcode: &str) -> Result<Option<Product>, GatewayError>;
}

#[derive(Clone)]
pub struct OpenFoodFacts {
    client: Client,
    base_url: Url,
}

impl OpenFoodFacts {
    pub fn new(api: &ProductApiConfig, http: &HttpClientConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .timeout(http.timeout())
            .build()?;
        let base_url = Url::parse(&api.base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("product service URL {base_url} cannot take a path");
        }
        Ok(Self { client, base_url })
    }

    /// `<base>/product/<barcode>` with the barcode as exactly one encoded path segment.
    /// `None` when the barcode could not name a single segment.
    fn product_url(&self, barcode: &str) -> Option<Url> {
        if !is_single_segment(barcode) {
            return None;
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("product")
            .push(barcode);
        Some(url)
    }
}

fn is_single_segment(barcode: &str) -> bool {
    !matches!(barcode, "" | "." | "..")
        && !barcode
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#') || c.is_control())
}

#[async_trait]
impl ProductGateway for OpenFoodFacts {
    #[instrument(skip(self))]
    async fn fetch_product(&self, barcode: &str) -> Result<Option<Product>, GatewayError> {
        let Some(url) = self.product_url(barcode) else {
            warn!("barcode is not a single path segment; treating as not found");
            return Ok(None);
        };
        let res = self.client.get(url).send().await?;
        let status = res.status();

        if status == StatusCode::NOT_FOUND {
            debug!(%status, "product service reported not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(GatewayError::Transport(format!(
                "unexpected status {status} from product service"
            )));
        }

        let body: ProductResponse = res.json().await?;
        debug!(status = ?body.status, verbose = ?body.status_verbose, "product response");
        Ok(body.into_product())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::model::Grade;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn gateway(server: &MockServer) -> OpenFoodFacts {
        OpenFoodFacts::new(
            &ProductApiConfig {
                base_url: server.url("/api/v2/"),
            },
            &HttpClientConfig {
                timeout_secs: 5,
                user_agent: "nutriscan-test".into(),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fetches_and_maps_product() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v2/product/7622201766054")
                    .header("user-agent", "nutriscan-test");
                then.status(200).json_body(json!({
                    "status": 1,
                    "status_verbose": "product found",
                    "product": {
                        "product_name": "Chocolate Bar",
                        "brands": "Acme",
                        "nutriscore_grade": "b"
                    }
                }));
            })
            .await;

        let product = gateway(&server)
            .fetch_product("7622201766054")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(product.product_name.as_deref(), Some("Chocolate Bar"));
        assert_eq!(product.nutriscore_grade, Some(Grade::B));
    }

    #[tokio::test]
    async fn http_404_with_status_zero_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/product/123");
                then.status(404).json_body(json!({
                    "status": 0,
                    "status_verbose": "product not found"
                }));
            })
            .await;

        let res = gateway(&server).fetch_product("123").await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn barcode_cannot_leave_product_path() {
        let server = MockServer::start_async().await;
        let other = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/other");
                then.status(200).json_body(json!({
                    "status": 1,
                    "product": { "product_name": "Somebody Else" }
                }));
            })
            .await;
        let truncated = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/product/1");
                then.status(200).json_body(json!({
                    "status": 1,
                    "product": { "product_name": "Wrong Key" }
                }));
            })
            .await;

        let gw = gateway(&server);
        for barcode in ["../other", "1?x=y", "1#frag", "..", ""] {
            let res = gw.fetch_product(barcode).await.unwrap();
            assert!(res.is_none(), "{barcode:?} resolved to {res:?}");
        }

        assert_eq!(other.hits_async().await, 0);
        assert_eq!(truncated.hits_async().await, 0);
    }

    #[test]
    fn product_url_encodes_the_barcode() {
        let http = HttpClientConfig {
            timeout_secs: 5,
            user_agent: "nutriscan-test".into(),
        };
        for base in ["http://localhost/api/v2", "http://localhost/api/v2/"] {
            let gw = OpenFoodFacts::new(&ProductApiConfig { base_url: base.into() }, &http)
                .unwrap();
            assert_eq!(
                gw.product_url("12 34").unwrap().as_str(),
                "http://localhost/api/v2/product/12%2034"
            );
            assert!(gw.product_url("../other").is_none());
        }
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/product/123");
                then.status(503).body("maintenance");
            })
            .await;

        let err = gateway(&server).fetch_product("123").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn garbage_body_is_transport() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v2/product/123");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = gateway(&server).fetch_product("123").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
