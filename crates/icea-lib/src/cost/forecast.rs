//! Month-by-month cost projection with optional compounding growth

use super::round_cents;
use crate::models::ForecastPoint;

/// Monthly growth factor from an annual growth percentage
pub fn monthly_growth_factor(growth_rate_pct: Option<f64>) -> f64 {
    growth_rate_pct.map(|pct| (pct / 100.0) / 12.0).unwrap_or(0.0)
}

/// Project current and recommended monthly costs over `months` months.
///
/// Month 1 carries the base values; each later month scales both series by
/// `1 + g`. Pure in its inputs, so the series can be regenerated at will.
pub fn compute_forecast(
    current_monthly: f64,
    recommended_monthly: f64,
    months: u32,
    growth_rate_pct: Option<f64>,
) -> Vec<ForecastPoint> {
    let g = monthly_growth_factor(growth_rate_pct);
    let mut current = current_monthly;
    let mut recommended = recommended_monthly;

    (1..=months)
        .map(|month| {
            if month > 1 && g != 0.0 {
                current *= 1.0 + g;
                recommended *= 1.0 + g;
            }
            ForecastPoint {
                month,
                current_usd: round_cents(current),
                recommended_usd: round_cents(recommended),
                savings_usd: round_cents(current - recommended),
            }
        })
        .collect()
}
