//! Grid search with guardrails

use tracing::debug;

use super::SearchConfig;
use crate::cost::{compute_cost, round_cents};
use crate::models::{
    CostResult, ExecutorShape, NodeShape, PackingResult, RecommendedConfig, ReserveAssumptions,
    WorkloadProfile,
};
use crate::packing::{pack, EffectiveCapacity};

/// Result of one search run
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub recommendation: Option<RecommendedConfig>,
    /// Candidates that were packed, whether or not they passed the guardrails
    pub candidates_evaluated: usize,
}

/// Best-so-far accumulator
struct Candidate {
    cores: u32,
    memory_gb: u32,
    packing: PackingResult,
    cost: CostResult,
}

/// Executor shape search bound by a set of guardrails
#[derive(Debug, Clone, Default)]
pub struct RecommendationSearch {
    config: SearchConfig,
}

impl RecommendationSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search for the executor shape with the lowest waste fraction.
    ///
    /// Ties keep the first candidate seen in (cores, memory) ascending order.
    /// Candidate costs use the same utilization factor as the current cost so
    /// the reported savings compare like with like.
    pub fn search(
        &self,
        node: &NodeShape,
        workload: &WorkloadProfile,
        reserve: &ReserveAssumptions,
        current_cost: &CostResult,
        utilization_factor: Option<f64>,
    ) -> SearchOutcome {
        let capacity = EffectiveCapacity::of(node, reserve);
        if !capacity.is_usable() {
            return SearchOutcome {
                recommendation: None,
                candidates_evaluated: 0,
            };
        }

        let mem_min = self.config.min_executor_memory_gb.max(1);
        let mem_max = capacity.memory_gb.floor() as u32;

        let mut evaluated = 0usize;
        let mut best: Option<Candidate> = None;

        for &cores in &self.config.core_candidates {
            if cores == 0 || i64::from(cores) > capacity.cores {
                continue;
            }
            for memory_gb in mem_min..=mem_max {
                let executor = ExecutorShape {
                    cores,
                    memory_gb: f64::from(memory_gb),
                };
                let packing = pack(node, &executor, reserve);
                evaluated += 1;
                if !self.config.admits(packing.executors_per_node) {
                    continue;
                }

                let improves = best
                    .as_ref()
                    .map_or(true, |b| packing.waste < b.packing.waste);
                if improves {
                    let cost = compute_cost(node, workload, &packing, utilization_factor);
                    best = Some(Candidate {
                        cores,
                        memory_gb,
                        packing,
                        cost,
                    });
                }
            }
        }

        let recommendation = best.map(|b| RecommendedConfig {
            executor_cores: b.cores,
            executor_memory_gb: f64::from(b.memory_gb),
            executors_per_node: b.packing.executors_per_node,
            efficiency_score: b.packing.efficiency_score,
            waste: b.packing.waste,
            waste_cost_monthly_usd: b.cost.waste_cost_monthly_usd,
            savings_vs_current_monthly_usd: round_cents(
                current_cost.waste_cost_monthly_usd - b.cost.waste_cost_monthly_usd,
            ),
        });

        SearchOutcome {
            recommendation,
            candidates_evaluated: evaluated,
        }
    }
}

/// Recommend an executor shape using the default guardrails
pub fn recommend(
    node: &NodeShape,
    current_executor: &ExecutorShape,
    workload: &WorkloadProfile,
    reserve: &ReserveAssumptions,
    current_packing: &PackingResult,
    current_cost: &CostResult,
    utilization_factor: Option<f64>,
) -> Option<RecommendedConfig> {
    let outcome =
        RecommendationSearch::new().search(node, workload, reserve, current_cost, utilization_factor);

    if let Some(rec) = &outcome.recommendation {
        debug!(
            current_cores = current_executor.cores,
            current_memory_gb = current_executor.memory_gb,
            current_waste = current_packing.waste,
            recommended_cores = rec.executor_cores,
            recommended_memory_gb = rec.executor_memory_gb,
            recommended_waste = rec.waste,
            candidates = outcome.candidates_evaluated,
            "Recommendation search finished"
        );
    }

    outcome.recommendation
}
