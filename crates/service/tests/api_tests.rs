//! Integration tests for the analysis service endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use icea_lib::{
    health::{components, HealthRegistry},
    observability::ServiceMetrics,
    Analyzer, RiskThresholds, SearchConfig,
};
use icea_service::{
    api::{create_router, AppState},
    config::ServiceConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn setup_test_app() -> (Router, Arc<AppState>) {
    let health_registry = HealthRegistry::new();
    health_registry.register(components::ENGINE).await;
    health_registry.register(components::CACHE).await;

    let state = Arc::new(AppState::new(
        &ServiceConfig::default(),
        health_registry,
        ServiceMetrics::new(),
    ));
    (create_router(state.clone()), state)
}

fn balanced_request() -> Value {
    json!({
        "node": { "cores": 16, "memory_gb": 64.0, "hourly_cost_usd": 1.0, "count": 10 },
        "executor": { "cores": 4, "memory_gb": 16.0 },
        "workload": { "avg_runtime_minutes": 60.0, "jobs_per_day": 10.0 }
    })
}

fn cpu_bound_request() -> Value {
    json!({
        "cloud": "gcp",
        "node": { "cores": 8, "memory_gb": 64.0, "hourly_cost_usd": 1.0, "count": 5 },
        "executor": { "cores": 4, "memory_gb": 8.0 },
        "workload": { "avg_runtime_minutes": 60.0, "jobs_per_day": 10.0 },
        "assumptions": { "reserve_cores": 0, "reserve_memory_gb": 0.0 }
    })
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn counter_value(name: &str) -> f64 {
    prometheus::gather()
        .iter()
        .find(|f| f.get_name() == name)
        .map_or(0.0, |f| {
            f.get_metric()
                .iter()
                .map(|m| m.get_counter().get_value())
                .sum()
        })
}

async fn post_json(app: Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_v1_health() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = get(app, "/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "status": "ok", "service": "icea" }));
}

#[tokio::test]
async fn test_analyze_balanced_cluster() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = post_json(app, "/v1/analyze", &balanced_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["packing"]["executors_per_node"], 4);
    assert_eq!(body["packing"]["efficiency_score"], 100);
    assert_eq!(body["cost"]["hourly_cluster_cost_usd"], 10.0);
    assert_eq!(body["cost"]["daily_cost_usd"], 100.0);
    assert_eq!(body["cost"]["waste_cost_monthly_usd"], 0.0);
    assert_eq!(body["risk_notes"], json!([]));
}

#[tokio::test]
async fn test_analyze_cpu_bound_cluster_recommends() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = post_json(app, "/v1/analyze", &cpu_bound_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["packing"]["efficiency_score"], 25);
    // 5 nodes x $1 x 1h x 10 jobs = $50/day, 75% waste
    assert_eq!(body["cost"]["waste_cost_daily_usd"], 37.5);
    assert_eq!(body["cost"]["waste_cost_monthly_usd"], 1125.0);

    let rec = &body["recommendation"];
    assert_eq!(rec["executor_cores"], 1);
    assert_eq!(rec["executor_memory_gb"], 8.0);
    assert_eq!(rec["executors_per_node"], 8);
    assert_eq!(rec["savings_vs_current_monthly_usd"], 1125.0);
}

#[tokio::test]
async fn test_analyze_without_recommendation_returns_null() {
    let (app, _state) = setup_test_app().await;
    let mut req = balanced_request();
    req["node"]["memory_gb"] = json!(4.0);
    req["executor"]["memory_gb"] = json!(2.0);

    let (status, body) = post_json(app, "/v1/analyze", &req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["recommendation"].is_null());
}

#[tokio::test]
async fn test_invalid_input_returns_422_with_detail() {
    let (app, _state) = setup_test_app().await;
    let mut req = balanced_request();
    req["node"]["cores"] = json!(0);

    let (status, body) = post_json(app, "/v1/analyze", &req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("node.cores"));
}

#[tokio::test]
async fn test_missing_field_rejected() {
    let (app, _state) = setup_test_app().await;
    let req = json!({ "node": { "cores": 16 } });

    let (status, _body) = post_json(app, "/v1/analyze", &req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let (app, state) = setup_test_app().await;

    let (_, first) = post_json(app.clone(), "/v1/analyze", &cpu_bound_request()).await;
    assert_eq!(state.cache.len(), 1);

    let (status, second) = post_json(app, "/v1/analyze", &cpu_bound_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(state.cache.len(), 1);
}

#[tokio::test]
async fn test_forecast_empty_without_months() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = post_json(app, "/v1/forecast", &cpu_bound_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_forecast_with_months() {
    let (app, _state) = setup_test_app().await;
    let mut req = cpu_bound_request();
    req["forecast_months"] = json!(3);

    let (status, body) = post_json(app, "/v1/forecast", &req).await;
    assert_eq!(status, StatusCode::OK);

    let points = body.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["month"], 1);
    assert_eq!(points[0]["current_usd"], 1500.0);
    assert_eq!(points[0]["recommended_usd"], 375.0);
    assert_eq!(points[2]["savings_usd"], 1125.0);
}

#[tokio::test]
async fn test_summary_includes_insights() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = post_json(app, "/v1/summary", &cpu_bound_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysis"]["packing"]["efficiency_score"], 25);
    assert_eq!(body["benchmark"]["band"], "below");
    assert_eq!(body["sensitivity"]["current_monthly_usd"], 1500.0);
    assert_eq!(body["sensitivity"]["if_nodes_plus_one_monthly_usd"], 1800.0);
    assert_eq!(body["data_quality"]["suggest_peak_executor_memory"], true);
    assert!(body["forecast"].is_null());
}

#[tokio::test]
async fn test_healthz_reflects_components() {
    let (app, state) = setup_test_app().await;
    let (status, body) = get(app.clone(), "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");

    state
        .health_registry
        .set_unhealthy(components::ENGINE, "worker pool exhausted")
        .await;
    let (status, _) = get(app, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_readyz_follows_readiness_flag() {
    let (app, state) = setup_test_app().await;
    let (status, _) = get(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    state.health_registry.set_ready(true).await;
    let (status, body) = get(app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    let readiness: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(readiness["ready"], true);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_analysis_series() {
    let (app, _state) = setup_test_app().await;
    post_json(app.clone(), "/v1/analyze", &balanced_request()).await;

    let (status, body) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("icea_analysis_latency_seconds"));
    assert!(text.contains("icea_cache_misses_total"));
}

#[tokio::test]
async fn test_catalog_providers() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = get(app, "/v1/catalog/providers").await;

    assert_eq!(status, StatusCode::OK);
    let providers: Value = serde_json::from_slice(&body).unwrap();
    let ids: Vec<&str> = providers
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    for id in ["aws", "emr", "synapse", "dataproc", "on-prem"] {
        assert!(ids.contains(&id), "missing provider {}", id);
    }
}

#[tokio::test]
async fn test_catalog_regions_for_cloud() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = get(app.clone(), "/v1/catalog/regions?cloud=aws").await;

    assert_eq!(status, StatusCode::OK);
    let regions: Value = serde_json::from_slice(&body).unwrap();
    assert!(regions
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["id"] == "us-east-1"));

    let (status, body) = get(app.clone(), "/v1/catalog/regions?cloud=nimbus").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));

    let (status, _) = get(app, "/v1/catalog/regions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_instances_priced_by_region() {
    let (app, _state) = setup_test_app().await;
    let (status, body) = get(app.clone(), "/v1/catalog/instances?cloud=aws&region=eu-west-1").await;

    assert_eq!(status, StatusCode::OK);
    let instances: Value = serde_json::from_slice(&body).unwrap();
    let m5 = instances
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["id"] == "m5.4xlarge")
        .unwrap();
    assert_eq!(m5["cores"], 16);
    assert_eq!(m5["memory_gb"], 64.0);
    assert_eq!(m5["hourly_usd"], 0.856);

    // no regional price: falls back to hourly_usd
    let (_, body) = get(app, "/v1/catalog/instances?cloud=synapse&region=eastus").await;
    let instances: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(instances[1]["id"], "medium");
    assert_eq!(instances[1]["hourly_usd"], 1.144);
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (app, _state) = setup_test_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/v1/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/health")
                .header("x-request-id", "batch-7f3a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "batch-7f3a");
}

#[tokio::test]
async fn test_http_requests_counted_by_route() {
    let (app, _state) = setup_test_app().await;
    get(app.clone(), "/v1/catalog/regions?cloud=gcp").await;

    let (_, body) = get(app, "/metrics").await;
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("icea_http_requests_total"));
    assert!(text.contains(r#"path="/v1/catalog/regions""#));
    assert!(text.contains("icea_uptime_seconds"));
}

#[tokio::test]
async fn test_slow_analysis_times_out_with_504() {
    let mut state = AppState::new(
        &ServiceConfig::default(),
        HealthRegistry::new(),
        ServiceMetrics::new(),
    );
    state.analyze_timeout = Duration::ZERO;
    // every core count over 1 GB steps up to 1024 GB keeps the engine busy past the deadline
    state.analyzer = Analyzer::with_config(
        SearchConfig {
            core_candidates: (1..=256).collect(),
            min_executor_memory_gb: 1,
            max_executors_per_node: 256,
        },
        RiskThresholds::default(),
    );
    let state = Arc::new(state);

    let mut req = balanced_request();
    req["node"]["cores"] = json!(256);
    req["node"]["memory_gb"] = json!(1024.0);

    let before = counter_value("icea_timeouts_total");
    let (status, body) = post_json(create_router(state.clone()), "/v1/analyze", &req).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["detail"], "analysis exceeded 0s time limit");
    assert!(counter_value("icea_timeouts_total") > before);
    assert!(state.cache.is_empty());
}
