//! Rule evaluation for advisory risk notes

use super::{RiskKind, RiskNote, RiskThresholds};
use crate::models::{AnalyzeRequest, DataSkew, PackingResult};

const MB_PER_GB: f64 = 1024.0;

/// Evaluates the risk rules in a fixed order
#[derive(Debug, Clone, Default)]
pub struct RiskAdvisor {
    thresholds: RiskThresholds,
}

impl RiskAdvisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Run every rule; the output order is stable across calls
    pub fn evaluate(&self, request: &AnalyzeRequest, packing: &PackingResult) -> Vec<RiskNote> {
        let t = &self.thresholds;
        let workload = &request.workload;
        let executor_mem = request.executor.memory_gb;
        let total_executors = u64::from(request.node.count) * u64::from(packing.executors_per_node);
        let mut notes = Vec::new();

        if executor_mem < t.min_executor_memory_gb {
            notes.push(note(
                RiskKind::LowExecutorMemory,
                format!(
                    "Executor memory below {:.0} GB may increase OOM likelihood for many workloads.",
                    t.min_executor_memory_gb
                ),
            ));
        }

        if packing.executors_per_node > t.max_executors_per_node {
            notes.push(note(
                RiskKind::DenseExecutors,
                "High executors per node may increase scheduling and GC overhead.".to_string(),
            ));
        }

        if let Some(partitions) = workload.partition_count {
            let total_cores = total_executors * u64::from(request.executor.cores);
            if total_cores > 0 {
                let (p, c) = (partitions as f64, total_cores as f64);
                if p > t.parallelism_ratio * c {
                    notes.push(note(
                        RiskKind::TooManyPartitions,
                        format!(
                            "Partition count ({}) is much higher than total executor cores ({}). \
                             Consider a larger cluster or fewer partitions to limit task scheduling overhead.",
                            with_thousands(partitions),
                            with_thousands(total_cores)
                        ),
                    ));
                } else if c > t.parallelism_ratio * p {
                    notes.push(note(
                        RiskKind::IdleCores,
                        format!(
                            "Total executor cores ({}) is much higher than partition count ({}). \
                             Some cores may sit idle; consider aligning partitions with parallelism.",
                            with_thousands(total_cores),
                            with_thousands(partitions)
                        ),
                    ));
                }
            }
        }

        if let Some(input_gb) = workload.input_data_gb {
            if input_gb > 0.0 && executor_mem > 0.0 && total_executors > 0 {
                let per_executor = input_gb / total_executors as f64;
                if per_executor > t.input_per_executor_ratio * executor_mem {
                    notes.push(note(
                        RiskKind::SpillRisk,
                        format!(
                            "Input data per job ({:.0} GB) is large relative to executor memory ({:.0} GB). \
                             More executor memory or more partitions would reduce spill and shuffle pressure.",
                            input_gb, executor_mem
                        ),
                    ));
                }
            }
        }

        if let Some(concurrent) = workload.concurrent_jobs {
            let saturated = request.utilization_factor.map_or(true, |u| u >= 1.0);
            if concurrent > 1.0 && saturated {
                notes.push(note(
                    RiskKind::SharedCluster,
                    format!(
                        "Cluster runs ~{:.0} concurrent jobs. Set a utilization factor if cost should reflect shared usage.",
                        concurrent
                    ),
                ));
            }
        }

        if let Some(peak) = workload.peak_executor_memory_gb {
            if peak > 0.0 && executor_mem > 0.0 && peak >= t.peak_memory_ratio * executor_mem {
                notes.push(note(
                    RiskKind::NearOom,
                    format!(
                        "Observed peak executor memory ({:.1} GB) is close to or above the configured {:.0} GB. \
                         More executor memory would reduce OOM and spill risk.",
                        peak, executor_mem
                    ),
                ));
            }
        }

        let shuffle_mb =
            workload.shuffle_read_mb.unwrap_or(0.0) + workload.shuffle_write_mb.unwrap_or(0.0);
        if shuffle_mb > 0.0 && executor_mem > 0.0 && total_executors > 0 {
            let per_executor_gb = shuffle_mb / MB_PER_GB / total_executors as f64;
            if per_executor_gb > t.shuffle_per_executor_ratio * executor_mem {
                notes.push(note(
                    RiskKind::ShufflePressure,
                    "High shuffle volume relative to executor memory may increase spill and I/O. \
                     Consider more executor memory or less shuffle."
                        .to_string(),
                ));
            }
        }

        if workload.data_skew == Some(DataSkew::High) {
            notes.push(note(
                RiskKind::DataSkew,
                "High data skew can cause tail latency and idle executors. \
                 Repartitioning or salting hot keys balances the load."
                    .to_string(),
            ));
        }

        if let Some(spot) = workload.spot_pct {
            if spot > t.max_spot_pct {
                notes.push(note(
                    RiskKind::SpotInterruption,
                    format!(
                        "Cluster uses {:.0}% spot/preemptible capacity. Expect higher interrupt risk and cost variance.",
                        spot
                    ),
                ));
            }
        }

        notes
    }
}

/// Advisory notes as plain strings, using the default thresholds
pub fn risk_notes(request: &AnalyzeRequest, packing: &PackingResult) -> Vec<String> {
    RiskAdvisor::new()
        .evaluate(request, packing)
        .into_iter()
        .map(|n| n.message)
        .collect()
}

fn note(kind: RiskKind, message: String) -> RiskNote {
    RiskNote { kind, message }
}

/// 1234567 -> "1,234,567"
fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
