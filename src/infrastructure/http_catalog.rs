use crate::domain::catalog::{Product, Provider};
use crate::domain::ports::CatalogProvider;
use crate::error::{Result, UssdError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Catalog backed by a remote JSON API.
///
/// Expects `GET {base}/api/providers` and
/// `GET {base}/api/products?providerId={id}`, both returning camelCase arrays.
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Fetching catalog");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| UssdError::CatalogError(format!("{url}: {e}")))?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogProvider for HttpCatalog {
    async fn list_providers(&self) -> Result<Vec<Provider>> {
        self.fetch("/api/providers", &[]).await
    }

    async fn list_products(&self, provider_id: &str) -> Result<Vec<Product>> {
        self.fetch("/api/products", &[("providerId", provider_id)])
            .await
    }
}
