//! Report insights derived from a finished analysis
//!
//! Forecast, what-if sensitivity, benchmark band and a data-quality note.
//! These feed whatever renders the report; nothing here formats output.

use serde::{Deserialize, Serialize};

use crate::cost::{compute_forecast, round_cents, DAYS_PER_MONTH};
use crate::models::{AnalyzeRequest, AnalyzeResponse, CostResult, ForecastPoint, RecommendedConfig};

/// Runtime increase used by the sensitivity what-if
const RUNTIME_INCREASE: f64 = 1.2;

/// Monthly cost if the cluster or workload changed shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensitivity {
    pub current_monthly_usd: f64,
    pub if_nodes_plus_one_monthly_usd: f64,
    /// Absent for a single-node cluster
    pub if_nodes_minus_one_monthly_usd: Option<f64>,
    pub if_runtime_plus_20_pct_monthly_usd: f64,
    pub node_count: u32,
    pub has_recommendation: bool,
}

/// Efficiency score relative to typical clusters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkBand {
    Above,
    Typical,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub band: BenchmarkBand,
    pub text: String,
    pub efficiency_score: u32,
}

/// Which optional inputs informed the analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub optional_inputs_used: Vec<String>,
    pub suggest_peak_executor_memory: bool,
}

/// Everything a report needs, in one value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub analysis: AnalyzeResponse,
    pub forecast: Option<Vec<ForecastPoint>>,
    pub sensitivity: Sensitivity,
    pub benchmark: Benchmark,
    pub data_quality: DataQuality,
}

impl ReportSummary {
    pub fn build(request: &AnalyzeRequest, analysis: AnalyzeResponse) -> Self {
        let forecast = forecast_for(request, &analysis.cost, analysis.recommendation.as_ref());
        let mut sensitivity = sensitivity(request, &analysis.cost);
        sensitivity.has_recommendation = analysis.recommendation.is_some();
        let benchmark = benchmark(analysis.packing.efficiency_score);
        let data_quality = data_quality(request);
        Self {
            analysis,
            forecast,
            sensitivity,
            benchmark,
            data_quality,
        }
    }
}

/// Cost forecast for a request that asked for one.
///
/// Current monthly spend is the daily cost over a 30-day month; the
/// recommended series subtracts the recommendation's savings when there are
/// any.
pub fn forecast_for(
    request: &AnalyzeRequest,
    cost: &CostResult,
    recommendation: Option<&RecommendedConfig>,
) -> Option<Vec<ForecastPoint>> {
    let months = request.forecast_months.filter(|m| *m >= 1)?;
    let current_monthly = cost.daily_cost_usd * DAYS_PER_MONTH;
    let recommended_monthly = match recommendation {
        Some(rec) if rec.savings_vs_current_monthly_usd != 0.0 => {
            current_monthly - rec.savings_vs_current_monthly_usd
        }
        _ => current_monthly,
    };
    Some(compute_forecast(
        current_monthly,
        recommended_monthly,
        months,
        request.growth_rate_pct,
    ))
}

/// What-if monthly costs: one node more, one node fewer, 20% longer runtime
pub fn sensitivity(request: &AnalyzeRequest, cost: &CostResult) -> Sensitivity {
    let n = f64::from(request.node.count);
    let monthly = cost.daily_cost_usd * DAYS_PER_MONTH;
    let minus_one = (request.node.count > 1).then(|| round_cents(monthly * (n - 1.0) / n));

    Sensitivity {
        current_monthly_usd: round_cents(monthly),
        if_nodes_plus_one_monthly_usd: round_cents(monthly * (n + 1.0) / n),
        if_nodes_minus_one_monthly_usd: minus_one,
        if_runtime_plus_20_pct_monthly_usd: round_cents(monthly * RUNTIME_INCREASE),
        node_count: request.node.count,
        has_recommendation: false,
    }
}

pub fn benchmark(efficiency_score: u32) -> Benchmark {
    let (band, text) = if efficiency_score >= 80 {
        (BenchmarkBand::Above, "above typical for similar clusters")
    } else if efficiency_score >= 50 {
        (BenchmarkBand::Typical, "in line with typical for similar clusters")
    } else {
        (BenchmarkBand::Below, "below typical for similar clusters")
    };
    Benchmark {
        band,
        text: text.to_string(),
        efficiency_score,
    }
}

pub fn data_quality(request: &AnalyzeRequest) -> DataQuality {
    let w = &request.workload;
    let supplied = [
        (w.partition_count.is_some(), "partition count"),
        (w.input_data_gb.is_some(), "input data (GB)"),
        (w.concurrent_jobs.is_some(), "concurrent jobs"),
        (w.peak_executor_memory_gb.is_some(), "peak executor memory (GB)"),
        (
            w.shuffle_read_mb.is_some() || w.shuffle_write_mb.is_some(),
            "shuffle read/write",
        ),
        (w.data_skew.is_some(), "data skew"),
        (w.spot_pct.is_some(), "spot %"),
        (request.utilization_factor.is_some(), "utilization factor"),
    ];

    DataQuality {
        optional_inputs_used: supplied
            .iter()
            .filter(|(used, _)| *used)
            .map(|(_, name)| name.to_string())
            .collect(),
        suggest_peak_executor_memory: w.peak_executor_memory_gb.is_none(),
    }
}
