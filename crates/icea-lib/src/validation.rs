//! Boundary validation for analysis requests
//!
//! The engine assumes range-correct input; hosts call [`validate`] before
//! handing a request to it.

use crate::error::ValidationError;
use crate::models::AnalyzeRequest;

const MAX_LABEL_LEN: usize = 64;

fn range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn at_least(field: &'static str, value: f64, min: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < min {
        return Err(ValidationError::BelowMinimum { field, min, value });
    }
    Ok(())
}

fn optional(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| range(field, v, min, max))
}

fn label(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(s) if s.chars().count() > MAX_LABEL_LEN => Err(ValidationError::TooLong {
            field,
            max: MAX_LABEL_LEN,
        }),
        _ => Ok(()),
    }
}

/// Check every field of a request against its accepted range
pub fn validate(request: &AnalyzeRequest) -> Result<(), ValidationError> {
    let node = &request.node;
    range("node.cores", f64::from(node.cores), 1.0, 256.0)?;
    range("node.memory_gb", node.memory_gb, 1.0, 1024.0)?;
    at_least("node.hourly_cost_usd", node.hourly_cost_usd, 0.0)?;
    range("node.count", f64::from(node.count), 1.0, 10_000.0)?;

    let executor = &request.executor;
    range("executor.cores", f64::from(executor.cores), 1.0, 32.0)?;
    range("executor.memory_gb", executor.memory_gb, 1.0, 128.0)?;

    let w = &request.workload;
    range("workload.avg_runtime_minutes", w.avg_runtime_minutes, 0.1, 1440.0)?;
    range("workload.jobs_per_day", w.jobs_per_day, 0.1, 100_000.0)?;
    optional("workload.min_runtime_minutes", w.min_runtime_minutes, 0.0, 1440.0)?;
    optional("workload.max_runtime_minutes", w.max_runtime_minutes, 0.0, 1440.0)?;
    optional(
        "workload.partition_count",
        w.partition_count.map(|p| p as f64),
        1.0,
        1_000_000.0,
    )?;
    optional("workload.input_data_gb", w.input_data_gb, 0.01, 1_000_000.0)?;
    optional("workload.concurrent_jobs", w.concurrent_jobs, 0.1, 10_000.0)?;
    optional(
        "workload.peak_executor_memory_gb",
        w.peak_executor_memory_gb,
        0.5,
        128.0,
    )?;
    optional("workload.shuffle_read_mb", w.shuffle_read_mb, 0.0, 10_000_000.0)?;
    optional("workload.shuffle_write_mb", w.shuffle_write_mb, 0.0, 10_000_000.0)?;
    optional("workload.spot_pct", w.spot_pct, 0.0, 100.0)?;
    optional(
        "workload.autoscale_min_nodes",
        w.autoscale_min_nodes.map(f64::from),
        1.0,
        10_000.0,
    )?;
    optional(
        "workload.autoscale_max_nodes",
        w.autoscale_max_nodes.map(f64::from),
        1.0,
        10_000.0,
    )?;

    let a = &request.assumptions;
    range("assumptions.reserve_cores", f64::from(a.reserve_cores), 0.0, 16.0)?;
    range("assumptions.reserve_memory_gb", a.reserve_memory_gb, 0.0, 32.0)?;

    optional("utilization_factor", request.utilization_factor, 0.01, 1.0)?;
    optional(
        "forecast_months",
        request.forecast_months.map(f64::from),
        1.0,
        36.0,
    )?;
    optional("growth_rate_pct", request.growth_rate_pct, -50.0, 500.0)?;

    label("region", request.region.as_deref())?;
    label("instance_type", request.instance_type.as_deref())?;

    Ok(())
}
