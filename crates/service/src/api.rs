//! HTTP API: analysis and catalog endpoints plus health checks and Prometheus metrics

use axum::{
    extract::{MatchedPath, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use icea_lib::{
    cache::AnalysisCache,
    catalog::{Catalog, CatalogEntry, InstanceType},
    health::{components, ComponentStatus, HealthRegistry},
    insights::{forecast_for, ReportSummary},
    observability::{ServiceMetrics, StructuredLogger},
    risk::RiskThresholds,
    validate, AnalyzeRequest, AnalyzeResponse, Analyzer, ForecastPoint, IceaError,
    ValidationError,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, info_span, Level, Span};

use crate::config::ServiceConfig;

pub const SERVICE_NAME: &str = "icea";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub cache: AnalysisCache,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
    pub catalog: Arc<Catalog>,
    pub analyze_timeout: Duration,
}

impl AppState {
    pub fn new(config: &ServiceConfig, health_registry: HealthRegistry, metrics: ServiceMetrics) -> Self {
        Self {
            analyzer: Analyzer::with_config(config.search_config(), RiskThresholds::default()),
            cache: AnalysisCache::new(config.cache_ttl(), config.cache_max_entries),
            health_registry,
            metrics,
            logger: StructuredLogger::new(SERVICE_NAME),
            catalog: Arc::new(Catalog::builtin()),
            analyze_timeout: config.analyze_timeout(),
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }
}

/// Errors surfaced to HTTP clients
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Timeout(u64),
    Internal(String),
}

impl From<IceaError> for ApiError {
    fn from(err: IceaError) -> Self {
        match err {
            IceaError::Validation(e) => ApiError::Validation(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Timeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("analysis exceeded {}s time limit", secs),
            ),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Analysis failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Validate, then serve from cache or compute on a blocking thread
async fn analysis_for(state: &AppState, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ApiError> {
    if let Err(e) = validate(request) {
        state.metrics.inc_validation_failure();
        return Err(ApiError::Validation(e));
    }

    let key = AnalysisCache::key(request)?;
    if let Some(cached) = state.cache.get(&key) {
        state.metrics.inc_cache_hit();
        return Ok(cached);
    }
    state.metrics.inc_cache_miss();

    let analyzer = state.analyzer.clone();
    let owned = request.clone();
    let started = Instant::now();
    let task = tokio::task::spawn_blocking(move || analyzer.analyze(&owned));

    let outcome = match tokio::time::timeout(state.analyze_timeout, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_err)) => return Err(task_failed(state, join_err).await),
        Err(_) => {
            let secs = state.analyze_timeout.as_secs();
            state.metrics.inc_timeout();
            state.logger.log_timeout(&key, secs);
            return Err(ApiError::Timeout(secs));
        }
    };

    let elapsed = started.elapsed();
    let response = outcome.response;
    state.metrics.observe_analysis(
        elapsed.as_secs_f64(),
        outcome.candidates_evaluated,
        response.recommendation.is_some(),
    );
    state.logger.log_analysis(
        &key,
        response.packing.efficiency_score,
        response.cost.waste_cost_monthly_usd,
        response
            .recommendation
            .as_ref()
            .map(|r| r.savings_vs_current_monthly_usd),
        outcome.candidates_evaluated,
        elapsed.as_millis(),
    );

    state.cache.insert(key, response.clone());
    Ok(response)
}

/// A panic inside the engine marks it unhealthy until restart
async fn task_failed(state: &AppState, err: JoinError) -> ApiError {
    if err.is_panic() {
        state
            .health_registry
            .set_unhealthy(components::ENGINE, "analysis task panicked")
            .await;
    }
    ApiError::Internal(err.to_string())
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    analysis_for(&state, &request).await.map(Json)
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<Vec<ForecastPoint>>, ApiError> {
    let response = analysis_for(&state, &request).await?;
    let points = forecast_for(&request, &response.cost, response.recommendation.as_ref());
    Ok(Json(points.unwrap_or_default()))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ReportSummary>, ApiError> {
    let response = analysis_for(&state, &request).await?;
    Ok(Json(ReportSummary::build(&request, response)))
}

#[derive(Debug, Deserialize)]
pub struct RegionsQuery {
    pub cloud: String,
}

#[derive(Debug, Deserialize)]
pub struct InstancesQuery {
    pub cloud: String,
    pub region: Option<String>,
}

async fn catalog_providers(State(state): State<Arc<AppState>>) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog.providers())
}

async fn catalog_regions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegionsQuery>,
) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog.regions(&query.cloud))
}

async fn catalog_instances(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InstancesQuery>,
) -> Json<Vec<InstanceType>> {
    Json(
        state
            .catalog
            .instance_types(&query.cloud, query.region.as_deref()),
    )
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": SERVICE_NAME }))
}

/// 200 while operational, 503 once a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.refresh_uptime();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Count each request under its route template
async fn track_requests(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or("unmatched", MatchedPath::as_str)
        .to_string();

    let started = Instant::now();
    let response = next.run(request).await;
    state
        .metrics
        .observe_http_request(&method, &path, started.elapsed().as_secs_f64());
    response
}

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/analyze", post(analyze))
        .route("/v1/forecast", post(forecast))
        .route("/v1/summary", post(summary))
        .route("/v1/catalog/providers", get(catalog_providers))
        .route("/v1/catalog/regions", get(catalog_regions))
        .route("/v1/catalog/instances", get(catalog_instances))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(request_span)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
