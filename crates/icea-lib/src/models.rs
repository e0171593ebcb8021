//! Core data models for the cluster efficiency analyzer

use serde::{Deserialize, Serialize};

/// One homogeneous worker machine type and how many of them the cluster runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeShape {
    pub cores: u32,
    pub memory_gb: f64,
    pub hourly_cost_usd: f64,
    pub count: u32,
}

/// Fixed resource footprint of one executor process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorShape {
    pub cores: u32,
    pub memory_gb: f64,
}

/// Data skew level reported for a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSkew {
    Low,
    Medium,
    High,
}

/// Workload timing, frequency and optional refinement signals.
///
/// Only `avg_runtime_minutes` and `jobs_per_day` participate in cost; the
/// optional fields feed the risk advisor and the data-quality note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadProfile {
    pub avg_runtime_minutes: f64,
    pub jobs_per_day: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_runtime_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_runtime_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent_jobs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_executor_memory_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_read_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_write_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_skew: Option<DataSkew>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale_min_nodes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale_max_nodes: Option<u32>,
}

impl WorkloadProfile {
    /// Workload with only the cost-relevant fields set
    pub fn new(avg_runtime_minutes: f64, jobs_per_day: f64) -> Self {
        Self {
            avg_runtime_minutes,
            jobs_per_day,
            min_runtime_minutes: None,
            max_runtime_minutes: None,
            partition_count: None,
            input_data_gb: None,
            concurrent_jobs: None,
            peak_executor_memory_gb: None,
            shuffle_read_mb: None,
            shuffle_write_mb: None,
            data_skew: None,
            spot_pct: None,
            autoscale_min_nodes: None,
            autoscale_max_nodes: None,
        }
    }
}

/// Capacity withheld on every node for the OS and daemons
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReserveAssumptions {
    #[serde(default)]
    pub reserve_cores: u32,
    #[serde(default)]
    pub reserve_memory_gb: f64,
}

/// Outcome of fitting executors onto one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingResult {
    pub executors_per_node: u32,
    pub cpu_utilization: f64,
    pub mem_utilization: f64,
    pub cpu_waste: f64,
    pub mem_waste: f64,
    /// max(cpu_waste, mem_waste)
    pub waste: f64,
    /// 0-100
    pub efficiency_score: u32,
}

/// Cluster cost figures, rounded to cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostResult {
    pub hourly_cluster_cost_usd: f64,
    pub daily_cost_usd: f64,
    pub waste_cost_daily_usd: f64,
    pub waste_cost_monthly_usd: f64,
}

/// Alternative executor shape found by the recommendation search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedConfig {
    pub executor_cores: u32,
    pub executor_memory_gb: f64,
    pub executors_per_node: u32,
    pub efficiency_score: u32,
    pub waste: f64,
    pub waste_cost_monthly_usd: f64,
    /// Not clamped: zero or negative when the search found no cheaper shape
    pub savings_vs_current_monthly_usd: f64,
}

/// One month of a cost projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: u32,
    pub current_usd: f64,
    pub recommended_usd: f64,
    pub savings_usd: f64,
}

fn default_cloud() -> String {
    "aws".to_string()
}

/// Input to a full analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default = "default_cloud")]
    pub cloud: String,
    pub node: NodeShape,
    pub executor: ExecutorShape,
    pub workload: WorkloadProfile,
    #[serde(default)]
    pub assumptions: ReserveAssumptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Shared-cluster share of cost, (0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilization_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_months: Option<u32>,
    /// Annual growth in percent, compounded monthly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_rate_pct: Option<f64>,
}

impl AnalyzeRequest {
    pub fn new(node: NodeShape, executor: ExecutorShape, workload: WorkloadProfile) -> Self {
        Self {
            cloud: default_cloud(),
            node,
            executor,
            workload,
            assumptions: ReserveAssumptions::default(),
            region: None,
            instance_type: None,
            utilization_factor: None,
            forecast_months: None,
            growth_rate_pct: None,
        }
    }
}

/// Result of a full analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub packing: PackingResult,
    pub cost: CostResult,
    pub recommendation: Option<RecommendedConfig>,
    #[serde(default)]
    pub risk_notes: Vec<String>,
}
