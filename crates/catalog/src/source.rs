use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Error, Result};

/// One row of the remote strategy sheet. Both columns must be present for
/// the row to survive into the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fetches the tabular strategy listing for one category.
///
/// `HttpCatalogSource` is the production implementation; tests substitute
/// a canned one so the cache's failure policy can be exercised offline.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_category(&self, key: &str) -> Result<Vec<CatalogRow>>;
}

/// Fetches `GET {base_url}/{key}` and expects a JSON array of rows.
pub struct HttpCatalogSource {
    base_url: String,
    http: Client,
}

impl HttpCatalogSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_category(&self, key: &str) -> Result<Vec<CatalogRow>> {
        let url = format!("{}/{key}", self.base_url.trim_end_matches('/'));
        debug!(%url, "Fetching strategy catalog category");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Catalog(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Catalog(format!("HTTP {status} from {url}")));
        }

        resp.json::<Vec<CatalogRow>>()
            .await
            .map_err(|e| Error::Catalog(format!("invalid catalog body: {e}")))
    }
}
