//! Service configuration

use anyhow::{Context, Result};
use icea_lib::{catalog::Catalog, recommend::SearchConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Service configuration, read from `ICEA_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on one analysis, in seconds
    #[serde(default = "default_analyze_timeout")]
    pub analyze_timeout_secs: u64,

    /// 0 disables the response cache
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    #[serde(default = "default_min_executor_memory")]
    pub min_executor_memory_gb: u32,

    #[serde(default = "default_max_executors_per_node")]
    pub max_executors_per_node: u32,

    /// Directory of `<provider>.json` catalog files; unset uses the built-in catalog
    #[serde(default)]
    pub catalog_dir: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_analyze_timeout() -> u64 {
    60
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    500
}

fn default_min_executor_memory() -> u32 {
    icea_lib::recommend::MIN_EXECUTOR_MEMORY_GB
}

fn default_max_executors_per_node() -> u32 {
    icea_lib::recommend::MAX_EXECUTORS_PER_NODE
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            analyze_timeout_secs: default_analyze_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            cache_max_entries: default_cache_max_entries(),
            min_executor_memory_gb: default_min_executor_memory(),
            max_executors_per_node: default_max_executors_per_node(),
            catalog_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("ICEA").try_parsing(true))
            .build()
            .context("failed to read ICEA_* environment")?;
        Self::from_config(config)
    }

    pub fn from_config(config: config::Config) -> Result<Self> {
        config
            .try_deserialize()
            .context("invalid service configuration")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_secs(self.analyze_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_dir {
            Some(dir) => Catalog::load_dir(Path::new(dir))
                .with_context(|| format!("failed to load catalog from {}", dir)),
            None => Ok(Catalog::builtin()),
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            min_executor_memory_gb: self.min_executor_memory_gb,
            max_executors_per_node: self.max_executors_per_node,
            ..SearchConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config::Config::builder().build().unwrap();
        let cfg = ServiceConfig::from_config(config).unwrap();
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.analyze_timeout(), Duration::from_secs(60));
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(300));
        assert_eq!(cfg.cache_max_entries, 500);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
        assert_eq!(cfg.search_config(), SearchConfig::default());
    }

    #[test]
    fn test_overrides_apply() {
        let config = config::Config::builder()
            .set_override("port", 9100)
            .unwrap()
            .set_override("cache_ttl_secs", 0)
            .unwrap()
            .set_override("max_executors_per_node", 8)
            .unwrap()
            .build()
            .unwrap();
        let cfg = ServiceConfig::from_config(config).unwrap();
        assert_eq!(cfg.port, 9100);
        assert!(cfg.cache_ttl().is_zero());
        assert_eq!(cfg.search_config().max_executors_per_node, 8);
        assert_eq!(cfg.search_config().min_executor_memory_gb, 6);
    }

    #[test]
    fn test_catalog_source() {
        let builtin = ServiceConfig::default().catalog().unwrap();
        assert!(builtin.providers().iter().any(|p| p.id == "aws"));

        let missing = ServiceConfig {
            catalog_dir: Some("/nonexistent/icea-catalog".to_string()),
            ..ServiceConfig::default()
        };
        assert!(missing.catalog().is_err());
    }
}
