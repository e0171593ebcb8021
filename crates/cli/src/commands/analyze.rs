//! `icea analyze`: packing, cost, recommendation and risk notes

use anyhow::Result;
use colored::Colorize;
use icea_lib::{AnalyzeRequest, AnalyzeResponse};
use tabled::Tabled;

use crate::backend::Backend;
use crate::output::{
    color_savings, color_score, format_gb, format_pct, format_usd, print_json, print_success,
    print_warning, section, OutputFormat,
};

/// Row for the current-vs-recommended comparison
#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "")]
    metric: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
}

pub async fn run(backend: &Backend, request: &AnalyzeRequest, format: OutputFormat) -> Result<()> {
    let response = backend.analyze(request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => render(request, &response),
    }

    Ok(())
}

/// Human-readable report of one analysis
pub fn render(request: &AnalyzeRequest, response: &AnalyzeResponse) {
    let packing = &response.packing;
    let cost = &response.cost;

    println!("{}", "Cluster Efficiency".bold());
    println!("{}", "=".repeat(50));
    println!(
        "Cluster:                {} x {} cores / {} ({})",
        request.node.count,
        request.node.cores,
        format_gb(request.node.memory_gb),
        request.cloud.cyan()
    );
    println!(
        "Executor:               {} cores / {}",
        request.executor.cores,
        format_gb(request.executor.memory_gb)
    );

    section("Packing");
    println!("Executors per node:     {}", packing.executors_per_node);
    println!("CPU utilization:        {}", format_pct(packing.cpu_utilization));
    println!("Memory utilization:     {}", format_pct(packing.mem_utilization));
    println!("Waste:                  {}", format_pct(packing.waste));
    println!("Efficiency score:       {}", color_score(packing.efficiency_score));

    section("Cost");
    println!("Hourly (cluster):       {}", format_usd(cost.hourly_cluster_cost_usd));
    println!("Daily:                  {}", format_usd(cost.daily_cost_usd));
    println!("Waste (daily):          {}", format_usd(cost.waste_cost_daily_usd));
    println!(
        "Waste (monthly):        {}",
        format_usd(cost.waste_cost_monthly_usd).red()
    );

    section("Recommendation");
    match &response.recommendation {
        Some(rec) => {
            let rows = vec![
                ComparisonRow {
                    metric: "Executor cores".to_string(),
                    current: request.executor.cores.to_string(),
                    recommended: rec.executor_cores.to_string(),
                },
                ComparisonRow {
                    metric: "Executor memory".to_string(),
                    current: format_gb(request.executor.memory_gb),
                    recommended: format_gb(rec.executor_memory_gb),
                },
                ComparisonRow {
                    metric: "Executors per node".to_string(),
                    current: packing.executors_per_node.to_string(),
                    recommended: rec.executors_per_node.to_string(),
                },
                ComparisonRow {
                    metric: "Efficiency score".to_string(),
                    current: packing.efficiency_score.to_string(),
                    recommended: rec.efficiency_score.to_string(),
                },
                ComparisonRow {
                    metric: "Waste (monthly)".to_string(),
                    current: format_usd(cost.waste_cost_monthly_usd),
                    recommended: format_usd(rec.waste_cost_monthly_usd),
                },
            ];
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);

            if rec.savings_vs_current_monthly_usd > 0.0 {
                print_success(&format!(
                    "Estimated savings: {} per month",
                    color_savings(rec.savings_vs_current_monthly_usd)
                ));
            } else {
                println!(
                    "{}",
                    "Current executor shape is already at or near the best option.".dimmed()
                );
            }
        }
        None => print_warning("No executor shape fits within the guardrails for this node"),
    }

    if !response.risk_notes.is_empty() {
        section("Risk notes");
        for note in &response.risk_notes {
            print_warning(note);
        }
    }
}
