//! Advisory risk flags
//!
//! Stateless heuristics over the raw request and its packing result. Every
//! rule is evaluated on its own; a missing optional signal silences its rule.
//! Notes are advisory and never block an analysis.

mod advisor;

pub use advisor::{risk_notes, RiskAdvisor};

use serde::{Deserialize, Serialize};

/// Which rule produced a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskKind {
    LowExecutorMemory,
    DenseExecutors,
    TooManyPartitions,
    IdleCores,
    SpillRisk,
    SharedCluster,
    NearOom,
    ShufflePressure,
    DataSkew,
    SpotInterruption,
}

impl std::fmt::Display for RiskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RiskKind::LowExecutorMemory => "low_executor_memory",
            RiskKind::DenseExecutors => "dense_executors",
            RiskKind::TooManyPartitions => "too_many_partitions",
            RiskKind::IdleCores => "idle_cores",
            RiskKind::SpillRisk => "spill_risk",
            RiskKind::SharedCluster => "shared_cluster",
            RiskKind::NearOom => "near_oom",
            RiskKind::ShufflePressure => "shuffle_pressure",
            RiskKind::DataSkew => "data_skew",
            RiskKind::SpotInterruption => "spot_interruption",
        };
        write!(f, "{}", name)
    }
}

/// One advisory note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskNote {
    pub kind: RiskKind,
    pub message: String,
}

/// Thresholds for the risk rules
#[derive(Debug, Clone, PartialEq)]
pub struct RiskThresholds {
    /// Executor memory below this is flagged (GB)
    pub min_executor_memory_gb: f64,
    /// More executors per node than this is flagged
    pub max_executors_per_node: u32,
    /// Partitions vs total executor cores imbalance ratio, either direction
    pub parallelism_ratio: f64,
    /// Input data per executor above this share of executor memory
    pub input_per_executor_ratio: f64,
    /// Observed peak above this share of configured executor memory
    pub peak_memory_ratio: f64,
    /// Shuffle volume per executor above this share of executor memory
    pub shuffle_per_executor_ratio: f64,
    /// Spot share above this percentage
    pub max_spot_pct: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            min_executor_memory_gb: 6.0,
            max_executors_per_node: 10,
            parallelism_ratio: 4.0,
            input_per_executor_ratio: 0.5,
            peak_memory_ratio: 0.9,
            shuffle_per_executor_ratio: 0.25,
            max_spot_pct: 50.0,
        }
    }
}
