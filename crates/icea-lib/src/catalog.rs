//! Instance catalog
//!
//! Providers, their regions and instance types with regional hourly prices.
//! A built-in catalog ships with the crate; a directory of `<provider>.json`
//! files can replace it.
//!
//! An instance's hourly price for a region resolves in this order: the
//! regional entry in `prices`, then `hourly_usd`, then the first listed
//! regional price, then zero.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{IceaError, IceaResult};

const BUILTIN: &[(&str, &str)] = &[
    ("aws", include_str!("../catalog/aws.json")),
    ("azure", include_str!("../catalog/azure.json")),
    ("dataproc", include_str!("../catalog/dataproc.json")),
    ("emr", include_str!("../catalog/emr.json")),
    ("gcp", include_str!("../catalog/gcp.json")),
    ("on-prem", include_str!("../catalog/on-prem.json")),
    ("synapse", include_str!("../catalog/synapse.json")),
];

/// `{ id, name }` pair used for providers and regions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

/// Instance type with its price resolved for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceType {
    pub id: String,
    pub name: String,
    pub cores: u32,
    pub memory_gb: f64,
    pub hourly_usd: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RegionRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct InstanceRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cores: u32,
    #[serde(default)]
    memory_gb: f64,
    #[serde(default)]
    hourly_usd: Option<f64>,
    #[serde(default)]
    prices: IndexMap<String, f64>,
}

impl InstanceRecord {
    fn hourly_for_region(&self, region: Option<&str>) -> f64 {
        region
            .and_then(|r| self.prices.get(r).copied())
            .or(self.hourly_usd)
            .or_else(|| self.prices.values().next().copied())
            .unwrap_or(0.0)
    }

    fn resolve(&self, region: Option<&str>) -> InstanceType {
        let hourly = self.hourly_for_region(region);
        InstanceType {
            id: self.id.clone(),
            name: self.name.clone().unwrap_or_else(|| self.id.clone()),
            cores: self.cores,
            memory_gb: self.memory_gb,
            hourly_usd: (hourly * 10_000.0).round_ties_even() / 10_000.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ProviderRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    regions: Vec<RegionRecord>,
    #[serde(default)]
    instance_types: Vec<InstanceRecord>,
}

/// Provider catalogs keyed by file stem, listed in id order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    providers: BTreeMap<String, ProviderRecord>,
}

impl Catalog {
    /// The catalog compiled into the crate
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for (stem, content) in BUILTIN {
            catalog.add(stem, content);
        }
        catalog
    }

    /// Load every `*.json` file in `dir`; files that fail to parse are skipped
    pub fn load_dir(dir: &Path) -> IceaResult<Self> {
        let read_err = |source| IceaError::Catalog {
            path: dir.to_path_buf(),
            source,
        };

        let mut catalog = Self::default();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if matches!(stem, "README" | "schema") {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(content) => catalog.add(stem, &content),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable catalog file"),
            }
        }

        debug!(dir = %dir.display(), providers = catalog.providers.len(), "Catalog loaded");
        Ok(catalog)
    }

    fn add(&mut self, stem: &str, content: &str) {
        match serde_json::from_str::<ProviderRecord>(content) {
            Ok(mut provider) => {
                provider.id.get_or_insert_with(|| stem.to_string());
                self.providers.insert(stem.to_string(), provider);
            }
            Err(e) => warn!(provider = %stem, error = %e, "Skipping malformed catalog file"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn providers(&self) -> Vec<CatalogEntry> {
        self.providers
            .iter()
            .map(|(stem, provider)| CatalogEntry {
                id: provider.id.clone().unwrap_or_else(|| stem.clone()),
                name: provider.name.clone().unwrap_or_else(|| stem.to_uppercase()),
            })
            .collect()
    }

    /// Regions for a provider; empty when the provider is unknown
    pub fn regions(&self, cloud: &str) -> Vec<CatalogEntry> {
        self.providers
            .get(cloud)
            .map(|provider| {
                provider.regions
                    .iter()
                    .map(|r| CatalogEntry {
                        id: r.id.clone(),
                        name: r.name.clone().unwrap_or_else(|| r.id.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Instance types for a provider, priced for `region`
    pub fn instance_types(&self, cloud: &str, region: Option<&str>) -> Vec<InstanceType> {
        self.providers
            .get(cloud)
            .map(|provider| {
                provider.instance_types
                    .iter()
                    .map(|i| i.resolve(region))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn instance(&self, cloud: &str, id: &str, region: Option<&str>) -> Option<InstanceType> {
        self.providers
            .get(cloud)?
            .instance_types
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.resolve(region))
    }
}
