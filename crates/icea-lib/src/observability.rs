//! Prometheus metrics and structured log events for analysis runs

use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec, Gauge,
    Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{info, warn};

/// Latency buckets in seconds
const LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
];

const CANDIDATE_BUCKETS: &[f64] = &[0.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0];

/// `None` when registration failed; metrics then become no-ops
static GLOBAL_METRICS: OnceLock<Option<ServiceMetricsInner>> = OnceLock::new();

struct ServiceMetricsInner {
    analysis_latency_seconds: Histogram,
    search_candidates: Histogram,
    analyses_total: IntCounter,
    recommendations_total: IntCounter,
    cache_hits_total: IntCounter,
    cache_misses_total: IntCounter,
    timeouts_total: IntCounter,
    validation_failures_total: IntCounter,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: Histogram,
    uptime_seconds: Gauge,
    started_at: Instant,
}

impl ServiceMetricsInner {
    fn register() -> prometheus::Result<Self> {
        Ok(Self {
            analysis_latency_seconds: register_histogram!(
                "icea_analysis_latency_seconds",
                "Time spent running one analysis",
                LATENCY_BUCKETS.to_vec()
            )?,
            search_candidates: register_histogram!(
                "icea_search_candidates",
                "Executor shapes evaluated per recommendation search",
                CANDIDATE_BUCKETS.to_vec()
            )?,
            analyses_total: register_int_counter!(
                "icea_analyses_total",
                "Analyses computed (cache hits excluded)"
            )?,
            recommendations_total: register_int_counter!(
                "icea_recommendations_total",
                "Analyses that produced a recommendation"
            )?,
            cache_hits_total: register_int_counter!(
                "icea_cache_hits_total",
                "Requests answered from the result cache"
            )?,
            cache_misses_total: register_int_counter!(
                "icea_cache_misses_total",
                "Requests that missed the result cache"
            )?,
            timeouts_total: register_int_counter!(
                "icea_timeouts_total",
                "Analyses abandoned after the time limit"
            )?,
            validation_failures_total: register_int_counter!(
                "icea_validation_failures_total",
                "Requests rejected by input validation"
            )?,
            http_requests_total: register_int_counter_vec!(
                "icea_http_requests_total",
                "HTTP requests by method and route",
                &["method", "path"]
            )?,
            http_request_duration_seconds: register_histogram!(
                "icea_http_request_duration_seconds",
                "HTTP request handling time",
                LATENCY_BUCKETS.to_vec()
            )?,
            uptime_seconds: register_gauge!("icea_uptime_seconds", "Process uptime in seconds")?,
            started_at: Instant::now(),
        })
    }
}

/// Handle to the process-wide metrics; clones share the same series
#[derive(Clone)]
pub struct ServiceMetrics {
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(|| {
            ServiceMetricsInner::register()
                .map_err(|e| warn!(error = %e, "Failed to register metrics"))
                .ok()
        });
        Self { _private: () }
    }

    fn inner(&self) -> Option<&ServiceMetricsInner> {
        GLOBAL_METRICS.get().and_then(Option::as_ref)
    }

    pub fn is_registered(&self) -> bool {
        self.inner().is_some()
    }

    /// Record one computed analysis
    pub fn observe_analysis(&self, duration_secs: f64, candidates: usize, recommended: bool) {
        if let Some(m) = self.inner() {
            m.analysis_latency_seconds.observe(duration_secs);
            m.search_candidates.observe(candidates as f64);
            m.analyses_total.inc();
            if recommended {
                m.recommendations_total.inc();
            }
        }
    }

    pub fn inc_cache_hit(&self) {
        if let Some(m) = self.inner() {
            m.cache_hits_total.inc();
        }
    }

    pub fn inc_cache_miss(&self) {
        if let Some(m) = self.inner() {
            m.cache_misses_total.inc();
        }
    }

    pub fn inc_timeout(&self) {
        if let Some(m) = self.inner() {
            m.timeouts_total.inc();
        }
    }

    pub fn inc_validation_failure(&self) {
        if let Some(m) = self.inner() {
            m.validation_failures_total.inc();
        }
    }

    /// Record one handled HTTP request; `path` is the route template
    pub fn observe_http_request(&self, method: &str, path: &str, duration_secs: f64) {
        if let Some(m) = self.inner() {
            m.http_requests_total.with_label_values(&[method, path]).inc();
            m.http_request_duration_seconds.observe(duration_secs);
        }
    }

    /// Set the uptime gauge; called before each scrape
    pub fn refresh_uptime(&self) {
        if let Some(m) = self.inner() {
            m.uptime_seconds.set(m.started_at.elapsed().as_secs_f64());
        }
    }
}

/// Structured log events for the service lifecycle and analysis runs
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_startup(&self, version: &str, addr: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            addr = %addr,
            "Analysis service started"
        );
    }

    pub fn log_analysis(
        &self,
        cache_key: &str,
        efficiency_score: u32,
        waste_cost_monthly_usd: f64,
        savings_monthly_usd: Option<f64>,
        candidates: usize,
        duration_ms: u128,
    ) {
        info!(
            event = "analysis_completed",
            service = %self.service,
            cache_key = %cache_key,
            efficiency_score = efficiency_score,
            waste_cost_monthly_usd = waste_cost_monthly_usd,
            savings_monthly_usd = ?savings_monthly_usd,
            candidates = candidates,
            duration_ms = duration_ms as u64,
            "Analysis completed"
        );
    }

    pub fn log_timeout(&self, cache_key: &str, limit_secs: u64) {
        warn!(
            event = "analysis_timed_out",
            service = %self.service,
            cache_key = %cache_key,
            limit_secs = limit_secs,
            "Analysis exceeded time limit"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Analysis service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_handles_share_registration() {
        let a = ServiceMetrics::new();
        let b = ServiceMetrics::new();
        assert!(a.is_registered());
        assert!(b.is_registered());

        a.observe_analysis(0.002, 320, true);
        b.inc_cache_hit();
        b.inc_cache_miss();
        a.inc_timeout();
        a.inc_validation_failure();

        let families = prometheus::gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "icea_analysis_latency_seconds"));
    }

    #[test]
    fn test_http_requests_counted_per_route() {
        let metrics = ServiceMetrics::new();
        metrics.observe_http_request("GET", "/v1/test-route", 0.001);
        metrics.observe_http_request("GET", "/v1/test-route", 0.002);
        metrics.refresh_uptime();

        let families = prometheus::gather();
        let requests = families
            .iter()
            .find(|f| f.get_name() == "icea_http_requests_total")
            .unwrap();
        let route = requests
            .get_metric()
            .iter()
            .find(|m| {
                m.get_label()
                    .iter()
                    .any(|l| l.get_name() == "path" && l.get_value() == "/v1/test-route")
            })
            .unwrap();
        assert_eq!(route.get_counter().get_value(), 2.0);
        assert!(families.iter().any(|f| f.get_name() == "icea_uptime_seconds"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("icea");
        assert_eq!(logger.service, "icea");
        logger.log_shutdown("test");
    }
}
