//! Where analyses run: the remote service, or this process

use anyhow::{Context, Result};
use icea_lib::{
    insights::forecast_for, validate, AnalyzeRequest, AnalyzeResponse, Analyzer, Catalog,
    CatalogEntry, ForecastPoint, InstanceType, ReportSummary,
};
use std::io::Read;
use std::path::Path;

use crate::client::ApiClient;

pub enum Backend {
    Remote(ApiClient),
    Offline(Analyzer),
}

impl Backend {
    pub fn remote(api_url: &str) -> Result<Self> {
        Ok(Backend::Remote(ApiClient::new(api_url)?))
    }

    pub fn offline() -> Self {
        Backend::Offline(Analyzer::new())
    }

    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        match self {
            Backend::Remote(client) => client.analyze(request).await,
            Backend::Offline(analyzer) => {
                validate(request).context("Invalid request")?;
                Ok(analyzer.analyze(request).response)
            }
        }
    }

    pub async fn forecast(&self, request: &AnalyzeRequest) -> Result<Vec<ForecastPoint>> {
        match self {
            Backend::Remote(client) => client.forecast(request).await,
            Backend::Offline(_) => {
                let response = self.analyze(request).await?;
                Ok(
                    forecast_for(request, &response.cost, response.recommendation.as_ref())
                        .unwrap_or_default(),
                )
            }
        }
    }

    pub async fn summary(&self, request: &AnalyzeRequest) -> Result<ReportSummary> {
        match self {
            Backend::Remote(client) => client.summary(request).await,
            Backend::Offline(_) => {
                let response = self.analyze(request).await?;
                Ok(ReportSummary::build(request, response))
            }
        }
    }
}

/// Where catalog lookups go: the service, or the built-in catalog
pub enum CatalogSource {
    Remote(ApiClient),
    Builtin(Catalog),
}

impl CatalogSource {
    pub fn new(api_url: &str, offline: bool) -> Result<Self> {
        if offline {
            Ok(CatalogSource::Builtin(Catalog::builtin()))
        } else {
            Ok(CatalogSource::Remote(ApiClient::new(api_url)?))
        }
    }

    pub async fn providers(&self) -> Result<Vec<CatalogEntry>> {
        match self {
            CatalogSource::Remote(client) => client.catalog_providers().await,
            CatalogSource::Builtin(catalog) => Ok(catalog.providers()),
        }
    }

    pub async fn regions(&self, cloud: &str) -> Result<Vec<CatalogEntry>> {
        match self {
            CatalogSource::Remote(client) => client.catalog_regions(cloud).await,
            CatalogSource::Builtin(catalog) => Ok(catalog.regions(cloud)),
        }
    }

    pub async fn instances(&self, cloud: &str, region: Option<&str>) -> Result<Vec<InstanceType>> {
        match self {
            CatalogSource::Remote(client) => client.catalog_instances(cloud, region).await,
            CatalogSource::Builtin(catalog) => Ok(catalog.instance_types(cloud, region)),
        }
    }
}

/// Read a JSON request from a file, or stdin for `-`
pub fn read_request(path: &Path) -> Result<AnalyzeRequest> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?
    };

    serde_json::from_str(&content).context("Request is not a valid analysis request")
}
