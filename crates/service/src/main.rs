//! icea-service - HTTP front end for infrastructure cost efficiency analysis

use anyhow::{Context, Result};
use icea_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
};
use icea_service::{api, config::ServiceConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServiceConfig::load()?;
    info!(
        port = config.port,
        analyze_timeout_secs = config.analyze_timeout_secs,
        cache_ttl_secs = config.cache_ttl_secs,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::CACHE).await;

    let metrics = ServiceMetrics::new();
    if !metrics.is_registered() {
        health_registry
            .set_degraded(components::ENGINE, "metrics unavailable")
            .await;
    }

    let catalog = config.catalog()?;
    if catalog.is_empty() {
        warn!("Instance catalog has no providers");
    }

    let state = Arc::new(
        api::AppState::new(&config, health_registry.clone(), metrics).with_catalog(catalog),
    );
    if !state.cache.is_enabled() {
        health_registry
            .set_degraded(components::CACHE, "response cache disabled")
            .await;
    }

    let addr = config.bind_addr();
    let logger = StructuredLogger::new(api::SERVICE_NAME);
    logger.log_startup(SERVICE_VERSION, &addr);

    health_registry.set_ready(true).await;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
        }
    };
    api::serve(&addr, state, shutdown)
        .await
        .context("API server failed")?;

    logger.log_shutdown("SIGINT received");
    Ok(())
}
