//! `icea forecast`: month-by-month cost projection

use anyhow::Result;
use colored::Colorize;
use icea_lib::{AnalyzeRequest, ForecastPoint};
use tabled::Tabled;

use crate::backend::Backend;
use crate::output::{format_usd, print_json, print_warning, OutputFormat};

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Month")]
    month: u32,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
    #[tabled(rename = "Savings")]
    savings: String,
}

impl From<&ForecastPoint> for ForecastRow {
    fn from(p: &ForecastPoint) -> Self {
        Self {
            month: p.month,
            current: format_usd(p.current_usd),
            recommended: format_usd(p.recommended_usd),
            savings: format_usd(p.savings_usd),
        }
    }
}

pub async fn run(
    backend: &Backend,
    request: &AnalyzeRequest,
    months: Option<u32>,
    growth_rate_pct: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let mut request = request.clone();
    if months.is_some() {
        request.forecast_months = months;
    }
    if growth_rate_pct.is_some() {
        request.growth_rate_pct = growth_rate_pct;
    }

    let points = backend.forecast(&request).await?;

    match format {
        OutputFormat::Json => print_json(&points)?,
        OutputFormat::Table => {
            if points.is_empty() {
                print_warning("No forecast requested; pass --months or set forecast_months");
                return Ok(());
            }
            render(&points, request.growth_rate_pct);
        }
    }

    Ok(())
}

pub fn render(points: &[ForecastPoint], growth_rate_pct: Option<f64>) {
    println!("{}", "Cost Forecast".bold());
    println!("{}", "=".repeat(50));
    println!(
        "Growth:                 {:.1}% per year",
        growth_rate_pct.unwrap_or(0.0)
    );

    let rows: Vec<ForecastRow> = points.iter().map(ForecastRow::from).collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);

    let total: f64 = points.iter().map(|p| p.savings_usd).sum();
    println!(
        "\n{} {}",
        "Total savings over period:".bold(),
        format_usd(total).green().bold()
    );
}
