//! Recommendation engine
//!
//! Grid search over executor shapes: every core candidate that fits the node,
//! crossed with 1 GB memory steps from the minimum-memory guardrail up to the
//! node's effective memory. Each candidate is packed and costed; the one with
//! the lowest waste fraction wins.

mod search;

pub use search::{recommend, RecommendationSearch, SearchOutcome};

/// Executor core counts tried by the search, in enumeration order
pub const CORE_CANDIDATES: &[u32] = &[1, 2, 3, 4, 5, 6, 8];

/// Smallest executor memory the search will suggest (GB)
pub const MIN_EXECUTOR_MEMORY_GB: u32 = 6;

/// Densest packing the search will suggest
pub const MAX_EXECUTORS_PER_NODE: u32 = 12;

/// Guardrails for the recommendation search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Executor core counts to try; filtered to those that fit the node
    pub core_candidates: Vec<u32>,
    /// Memory candidates start here (GB)
    pub min_executor_memory_gb: u32,
    /// Candidates packing more executors than this are discarded
    pub max_executors_per_node: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            core_candidates: CORE_CANDIDATES.to_vec(),
            min_executor_memory_gb: MIN_EXECUTOR_MEMORY_GB,
            max_executors_per_node: MAX_EXECUTORS_PER_NODE,
        }
    }
}

impl SearchConfig {
    /// Whether a packing falls inside the guardrails
    pub fn admits(&self, executors_per_node: u32) -> bool {
        executors_per_node > 0 && executors_per_node <= self.max_executors_per_node
    }
}
