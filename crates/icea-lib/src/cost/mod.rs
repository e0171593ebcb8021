//! Cost model
//!
//! Converts packing results and workload cadence into cluster cost figures:
//!
//! ```text
//! hourly  = hourly_cost_usd * count
//! daily   = hourly * (avg_runtime_minutes / 60) * jobs_per_day * utilization_factor
//! waste/d = daily * packing.waste
//! waste/m = waste/d * 30
//! ```
//!
//! Rounding to cents happens once, on the way out.

mod forecast;

pub use forecast::{compute_forecast, monthly_growth_factor};

use crate::models::{CostResult, NodeShape, PackingResult, WorkloadProfile};

/// Days per billing month
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Utilization factor actually applied: anything outside (0, 1] means a
/// dedicated cluster.
pub fn effective_utilization(utilization_factor: Option<f64>) -> f64 {
    match utilization_factor {
        Some(u) if u > 0.0 && u <= 1.0 => u,
        _ => 1.0,
    }
}

/// Compute cluster cost and the share of it lost to packing waste
pub fn compute_cost(
    node: &NodeShape,
    workload: &WorkloadProfile,
    packing: &PackingResult,
    utilization_factor: Option<f64>,
) -> CostResult {
    let u = effective_utilization(utilization_factor);

    let hourly_cluster_cost = node.hourly_cost_usd * f64::from(node.count);
    let daily_cost =
        hourly_cluster_cost * (workload.avg_runtime_minutes / 60.0) * workload.jobs_per_day * u;
    let waste_cost_daily = daily_cost * packing.waste;
    let waste_cost_monthly = waste_cost_daily * DAYS_PER_MONTH;

    CostResult {
        hourly_cluster_cost_usd: round_cents(hourly_cluster_cost),
        daily_cost_usd: round_cents(daily_cost),
        waste_cost_daily_usd: round_cents(waste_cost_daily),
        waste_cost_monthly_usd: round_cents(waste_cost_monthly),
    }
}

/// Round a dollar amount to two decimals; exact halves go to the even cent
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(hourly_cost_usd: f64, count: u32) -> NodeShape {
        NodeShape {
            cores: 16,
            memory_gb: 64.0,
            hourly_cost_usd,
            count,
        }
    }

    fn packing_with_waste(waste: f64) -> PackingResult {
        PackingResult {
            executors_per_node: 2,
            cpu_utilization: 1.0 - waste,
            mem_utilization: 1.0 - waste,
            cpu_waste: waste,
            mem_waste: waste,
            waste,
            efficiency_score: crate::packing::efficiency_score(waste),
        }
    }

    #[test]
    fn test_cost_without_waste() {
        let cost = compute_cost(
            &node(1.0, 10),
            &WorkloadProfile::new(60.0, 10.0),
            &packing_with_waste(0.0),
            None,
        );

        assert_eq!(cost.hourly_cluster_cost_usd, 10.0);
        assert_eq!(cost.daily_cost_usd, 100.0);
        assert_eq!(cost.waste_cost_daily_usd, 0.0);
        assert_eq!(cost.waste_cost_monthly_usd, 0.0);
    }

    #[test]
    fn test_cost_with_waste() {
        let cost = compute_cost(
            &node(2.0, 5),
            &WorkloadProfile::new(30.0, 20.0),
            &packing_with_waste(0.5),
            None,
        );

        assert_eq!(cost.hourly_cluster_cost_usd, 10.0);
        assert_eq!(cost.daily_cost_usd, 100.0);
        assert_eq!(cost.waste_cost_daily_usd, 50.0);
        assert_eq!(cost.waste_cost_monthly_usd, 1500.0);
    }

    #[test]
    fn test_utilization_factor_discounts_cost() {
        let cost = compute_cost(
            &node(2.0, 5),
            &WorkloadProfile::new(30.0, 20.0),
            &packing_with_waste(0.5),
            Some(0.25),
        );

        assert_eq!(cost.hourly_cluster_cost_usd, 10.0);
        assert_eq!(cost.daily_cost_usd, 25.0);
        assert_eq!(cost.waste_cost_monthly_usd, 375.0);
    }

    #[test]
    fn test_out_of_range_utilization_factor_is_ignored() {
        assert_eq!(effective_utilization(None), 1.0);
        assert_eq!(effective_utilization(Some(0.0)), 1.0);
        assert_eq!(effective_utilization(Some(-0.5)), 1.0);
        assert_eq!(effective_utilization(Some(1.5)), 1.0);
        assert_eq!(effective_utilization(Some(1.0)), 1.0);
        assert_eq!(effective_utilization(Some(0.4)), 0.4);
    }

    #[test]
    fn test_cost_is_linear_in_node_count_and_job_volume() {
        let workload = WorkloadProfile::new(45.0, 12.0);
        let packing = packing_with_waste(0.25);
        let base = compute_cost(&node(1.5, 4), &workload, &packing, None);

        let doubled_nodes = compute_cost(&node(1.5, 8), &workload, &packing, None);
        assert_eq!(doubled_nodes.daily_cost_usd, base.daily_cost_usd * 2.0);
        assert_eq!(
            doubled_nodes.waste_cost_monthly_usd,
            base.waste_cost_monthly_usd * 2.0
        );

        // same runtime x jobs product
        let reshaped = compute_cost(
            &node(1.5, 4),
            &WorkloadProfile::new(90.0, 6.0),
            &packing,
            None,
        );
        assert_eq!(reshaped, base);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(1.005_1), 1.01);
        assert_eq!(round_cents(2.344), 2.34);
        assert_eq!(round_cents(0.0), 0.0);
        assert_eq!(round_cents(0.125), 0.12);
        assert_eq!(round_cents(0.375), 0.38);
    }

    #[test]
    fn test_half_cent_costs_round_to_even() {
        let cost = compute_cost(
            &node(0.125, 1),
            &WorkloadProfile::new(60.0, 1.0),
            &packing_with_waste(0.875),
            None,
        );

        assert_eq!(cost.hourly_cluster_cost_usd, 0.12);
        assert_eq!(cost.daily_cost_usd, 0.12);
        assert_eq!(cost.waste_cost_daily_usd, 0.11);
        assert_eq!(cost.waste_cost_monthly_usd, 3.28);
    }
}
