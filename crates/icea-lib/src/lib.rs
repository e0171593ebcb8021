//! Infrastructure cost efficiency analysis for Spark clusters
//!
//! Given a node shape, an executor shape and a workload cadence, this crate
//! computes how executors pack onto nodes, what the cluster costs, how much
//! of that is lost to unused capacity, which executor shape would waste the
//! least, and which workload characteristics carry operational risk.
//!
//! Everything in the analysis path is pure and synchronous. The cache,
//! health registry and metrics exist for hosts that serve analyses, and the
//! instance catalog lets callers look up node shapes and regional prices.

pub mod analysis;
pub mod cache;
pub mod catalog;
pub mod cost;
pub mod error;
pub mod health;
pub mod insights;
pub mod models;
pub mod observability;
pub mod packing;
pub mod recommend;
pub mod risk;
pub mod validation;

pub use analysis::{analyze, AnalysisOutcome, Analyzer};
pub use cache::AnalysisCache;
pub use catalog::{Catalog, CatalogEntry, InstanceType};
pub use cost::{compute_cost, compute_forecast};
pub use error::{IceaError, IceaResult, ValidationError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use insights::ReportSummary;
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use packing::pack;
pub use recommend::{recommend, RecommendationSearch, SearchConfig};
pub use risk::{risk_notes, RiskAdvisor, RiskThresholds};
pub use validation::validate;
