//! Analysis pipeline: pack, cost, recommend, advise
//!
//! All stages are pure and synchronous. An [`Analyzer`] only carries the
//! search guardrails and risk thresholds, so one instance can be shared
//! across threads freely.

use tracing::debug;

use crate::cost::compute_cost;
use crate::insights::ReportSummary;
use crate::models::{AnalyzeRequest, AnalyzeResponse, ForecastPoint};
use crate::packing::pack;
use crate::recommend::{RecommendationSearch, SearchConfig};
use crate::risk::{RiskAdvisor, RiskThresholds};

/// Response plus bookkeeping the host may want for metrics
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub response: AnalyzeResponse,
    pub candidates_evaluated: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    search: RecommendationSearch,
    advisor: RiskAdvisor,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(search: SearchConfig, thresholds: RiskThresholds) -> Self {
        Self {
            search: RecommendationSearch::with_config(search),
            advisor: RiskAdvisor::with_thresholds(thresholds),
        }
    }

    pub fn search_config(&self) -> &SearchConfig {
        self.search.config()
    }

    /// Run the full pipeline over a pre-validated request
    pub fn analyze(&self, request: &AnalyzeRequest) -> AnalysisOutcome {
        let packing = pack(&request.node, &request.executor, &request.assumptions);
        debug!(
            executors_per_node = packing.executors_per_node,
            waste = packing.waste,
            efficiency_score = packing.efficiency_score,
            "Packing computed"
        );

        let cost = compute_cost(
            &request.node,
            &request.workload,
            &packing,
            request.utilization_factor,
        );
        debug!(
            daily_cost_usd = cost.daily_cost_usd,
            waste_cost_monthly_usd = cost.waste_cost_monthly_usd,
            "Cost computed"
        );

        let outcome = self.search.search(
            &request.node,
            &request.workload,
            &request.assumptions,
            &cost,
            request.utilization_factor,
        );
        debug!(
            candidates = outcome.candidates_evaluated,
            found = outcome.recommendation.is_some(),
            "Recommendation search finished"
        );

        let risk_notes = self
            .advisor
            .evaluate(request, &packing)
            .into_iter()
            .map(|n| n.message)
            .collect();

        AnalysisOutcome {
            response: AnalyzeResponse {
                packing,
                cost,
                recommendation: outcome.recommendation,
                risk_notes,
            },
            candidates_evaluated: outcome.candidates_evaluated,
        }
    }

    /// Forecast for a request; empty when no months were requested
    pub fn forecast(&self, request: &AnalyzeRequest) -> Vec<ForecastPoint> {
        let response = self.analyze(request).response;
        crate::insights::forecast_for(request, &response.cost, response.recommendation.as_ref())
            .unwrap_or_default()
    }

    /// Analysis plus report insights
    pub fn summarize(&self, request: &AnalyzeRequest) -> ReportSummary {
        let response = self.analyze(request).response;
        ReportSummary::build(request, response)
    }
}

/// Run the full pipeline with default guardrails and thresholds
pub fn analyze(request: &AnalyzeRequest) -> AnalyzeResponse {
    Analyzer::new().analyze(request).response
}
