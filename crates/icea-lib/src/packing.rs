//! Executor packing and utilization
//!
//! Fits fixed-size executors onto one node after per-node reserves are
//! withheld. The scarcer resource bounds the packing, so waste is the larger
//! of the two per-resource waste fractions.

use crate::models::{ExecutorShape, NodeShape, PackingResult, ReserveAssumptions};

/// Capacity of one node left for executors after reserves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveCapacity {
    pub cores: i64,
    pub memory_gb: f64,
}

impl EffectiveCapacity {
    pub fn of(node: &NodeShape, reserve: &ReserveAssumptions) -> Self {
        Self {
            cores: i64::from(node.cores) - i64::from(reserve.reserve_cores),
            memory_gb: node.memory_gb - reserve.reserve_memory_gb,
        }
    }

    /// False when reserves consume a whole dimension
    pub fn is_usable(&self) -> bool {
        self.cores > 0 && self.memory_gb > 0.0
    }
}

impl PackingResult {
    /// Executor does not fit at all; a displayable outcome, not an error
    pub fn degenerate() -> Self {
        Self {
            executors_per_node: 0,
            cpu_utilization: 0.0,
            mem_utilization: 0.0,
            cpu_waste: 1.0,
            mem_waste: 1.0,
            waste: 1.0,
            efficiency_score: 0,
        }
    }
}

/// Compute executors per node and utilization.
///
/// `executors_per_node = min(floor(C_eff / c), floor(M_eff / m))`
pub fn pack(
    node: &NodeShape,
    executor: &ExecutorShape,
    reserve: &ReserveAssumptions,
) -> PackingResult {
    let capacity = EffectiveCapacity::of(node, reserve);
    if !capacity.is_usable() {
        return PackingResult::degenerate();
    }

    let effective_cores = capacity.cores as f64;
    let effective_mem = capacity.memory_gb;

    let by_cpu = if executor.cores > 0 {
        (effective_cores / f64::from(executor.cores)).floor()
    } else {
        0.0
    };
    let by_mem = if executor.memory_gb > 0.0 {
        (effective_mem / executor.memory_gb).floor()
    } else {
        0.0
    };
    let executors = by_cpu.min(by_mem).max(0.0);

    let cpu_utilization = (executors * f64::from(executor.cores)) / effective_cores;
    let mem_utilization = (executors * executor.memory_gb) / effective_mem;
    let cpu_waste = 1.0 - cpu_utilization;
    let mem_waste = 1.0 - mem_utilization;
    let waste = cpu_waste.max(mem_waste);

    PackingResult {
        executors_per_node: executors as u32,
        cpu_utilization,
        mem_utilization,
        cpu_waste,
        mem_waste,
        waste,
        efficiency_score: efficiency_score(waste),
    }
}

/// round(100 * (1 - waste)), halves to even, clamped to [0, 100]
pub fn efficiency_score(waste: f64) -> u32 {
    (100.0 * (1.0 - waste)).round_ties_even().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(cores: u32, memory_gb: f64) -> NodeShape {
        NodeShape {
            cores,
            memory_gb,
            hourly_cost_usd: 1.0,
            count: 10,
        }
    }

    fn executor(cores: u32, memory_gb: f64) -> ExecutorShape {
        ExecutorShape { cores, memory_gb }
    }

    #[test]
    fn test_balanced_packing_is_fully_utilized() {
        let r = pack(&node(16, 64.0), &executor(4, 16.0), &ReserveAssumptions::default());

        assert_eq!(r.executors_per_node, 4);
        assert_eq!(r.cpu_utilization, 1.0);
        assert_eq!(r.mem_utilization, 1.0);
        assert_eq!(r.waste, 0.0);
        assert_eq!(r.efficiency_score, 100);
    }

    #[test]
    fn test_reserves_reduce_effective_capacity() {
        let reserve = ReserveAssumptions {
            reserve_cores: 1,
            reserve_memory_gb: 4.0,
        };
        let r = pack(&node(16, 64.0), &executor(4, 16.0), &reserve);

        // effective 15 cores / 60 GB
        assert_eq!(r.executors_per_node, 3);
        assert_eq!(r.cpu_utilization, 12.0 / 15.0);
        assert_eq!(r.mem_utilization, 48.0 / 60.0);
        assert_eq!(r.efficiency_score, 80);
    }

    #[test]
    fn test_cpu_bound_packing_wastes_memory() {
        let r = pack(&node(8, 64.0), &executor(4, 8.0), &ReserveAssumptions::default());

        assert_eq!(r.executors_per_node, 2);
        assert_eq!(r.cpu_utilization, 1.0);
        assert_eq!(r.mem_utilization, 0.25);
        assert_eq!(r.waste, 0.75);
        assert_eq!(r.efficiency_score, 25);
    }

    #[test]
    fn test_oversized_executor_packs_zero() {
        let r = pack(&node(4, 16.0), &executor(8, 32.0), &ReserveAssumptions::default());

        assert_eq!(r.executors_per_node, 0);
        assert_eq!(r.efficiency_score, 0);
        assert_eq!(r.waste, 1.0);
    }

    #[test]
    fn test_reserves_consuming_node_are_degenerate() {
        let reserve = ReserveAssumptions {
            reserve_cores: 4,
            reserve_memory_gb: 0.0,
        };
        let r = pack(&node(4, 16.0), &executor(1, 1.0), &reserve);
        assert_eq!(r, PackingResult::degenerate());

        let reserve = ReserveAssumptions {
            reserve_cores: 0,
            reserve_memory_gb: 16.0,
        };
        let r = pack(&node(4, 16.0), &executor(1, 1.0), &reserve);
        assert_eq!(r, PackingResult::degenerate());
    }

    #[test]
    fn test_packing_invariants_hold_across_shapes() {
        for node_cores in [1u32, 3, 8, 16, 48, 96] {
            for node_mem in [4.0, 15.5, 64.0, 384.0] {
                for exec_cores in [1u32, 2, 5, 8] {
                    for exec_mem in [1.0, 3.5, 8.0, 30.0] {
                        let n = node(node_cores, node_mem);
                        let e = executor(exec_cores, exec_mem);
                        let r = pack(&n, &e, &ReserveAssumptions::default());

                        let expected = (node_cores / exec_cores)
                            .min((node_mem / exec_mem).floor() as u32);
                        assert_eq!(r.executors_per_node, expected);
                        assert!((0.0..=1.0).contains(&r.waste));
                        assert_eq!(r.waste, r.cpu_waste.max(r.mem_waste));
                        assert_eq!(r.efficiency_score, efficiency_score(r.waste));
                        assert!(r.efficiency_score <= 100);
                    }
                }
            }
        }
    }

    #[test]
    fn test_efficiency_score_clamped() {
        assert_eq!(efficiency_score(0.0), 100);
        assert_eq!(efficiency_score(1.0), 0);
        assert_eq!(efficiency_score(1.5), 0);
        assert_eq!(efficiency_score(-0.2), 100);
        assert_eq!(efficiency_score(0.334), 67);
    }

    #[test]
    fn test_efficiency_score_half_rounds_to_even() {
        assert_eq!(efficiency_score(0.875), 12);
        assert_eq!(efficiency_score(0.625), 38);

        // memory-bound: one 5-core executor on an 8-core node uses 8 of 64 GB
        let r = pack(&node(8, 64.0), &executor(5, 8.0), &ReserveAssumptions::default());
        assert_eq!(r.executors_per_node, 1);
        assert_eq!(r.waste, 0.875);
        assert_eq!(r.efficiency_score, 12);
    }
}
