//! API client for the analysis service

use anyhow::{Context, Result};
use icea_lib::{
    AnalyzeRequest, AnalyzeResponse, CatalogEntry, ForecastPoint, InstanceType, ReportSummary,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(90))
            .build()
            .context("Failed to create HTTP client")?;

        // Keep any path prefix when joining relative routes
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            anyhow::bail!("API error ({}): {}", status, message);
        }

        response.json().await.context("Failed to parse response")
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        self.post("v1/analyze", request).await
    }

    pub async fn forecast(&self, request: &AnalyzeRequest) -> Result<Vec<ForecastPoint>> {
        self.post("v1/forecast", request).await
    }

    pub async fn summary(&self, request: &AnalyzeRequest) -> Result<ReportSummary> {
        self.post("v1/summary", request).await
    }

    pub async fn health(&self) -> Result<ServiceHealth> {
        self.get("v1/health").await
    }

    pub async fn catalog_providers(&self) -> Result<Vec<CatalogEntry>> {
        self.get("v1/catalog/providers").await
    }

    pub async fn catalog_regions(&self, cloud: &str) -> Result<Vec<CatalogEntry>> {
        self.get_with_query("v1/catalog/regions", &[("cloud", cloud)])
            .await
    }

    pub async fn catalog_instances(
        &self,
        cloud: &str,
        region: Option<&str>,
    ) -> Result<Vec<InstanceType>> {
        let mut query = vec![("cloud", cloud)];
        if let Some(region) = region {
            query.push(("region", region));
        }
        self.get_with_query("v1/catalog/instances", &query).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub service: String,
}

/// Error body returned by the service
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
