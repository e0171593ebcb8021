//! `icea summary`: analysis plus report insights

use anyhow::Result;
use colored::Colorize;
use icea_lib::{insights::BenchmarkBand, AnalyzeRequest};

use crate::backend::Backend;
use crate::commands::{analyze, forecast};
use crate::output::{format_usd, print_info, print_json, section, OutputFormat};

pub async fn run(backend: &Backend, request: &AnalyzeRequest, format: OutputFormat) -> Result<()> {
    let summary = backend.summary(request).await?;

    if format == OutputFormat::Json {
        return print_json(&summary);
    }

    println!(
        "{}",
        format!(
            "Generated {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
    analyze::render(request, &summary.analysis);

    section("Benchmark");
    let band = match summary.benchmark.band {
        BenchmarkBand::Above => summary.benchmark.text.green(),
        BenchmarkBand::Typical => summary.benchmark.text.yellow(),
        BenchmarkBand::Below => summary.benchmark.text.red(),
    };
    println!(
        "Efficiency {} is {}",
        summary.benchmark.efficiency_score, band
    );

    let s = &summary.sensitivity;
    section("What if");
    println!("Current (monthly):      {}", format_usd(s.current_monthly_usd));
    println!(
        "{:<24}{}",
        format!("{} nodes:", s.node_count + 1),
        format_usd(s.if_nodes_plus_one_monthly_usd)
    );
    if let Some(minus_one) = s.if_nodes_minus_one_monthly_usd {
        println!(
            "{:<24}{}",
            format!("{} nodes:", s.node_count - 1),
            format_usd(minus_one)
        );
    }
    println!(
        "Runtime +20%:           {}",
        format_usd(s.if_runtime_plus_20_pct_monthly_usd)
    );

    if let Some(points) = &summary.forecast {
        if !points.is_empty() {
            println!();
            forecast::render(points, request.growth_rate_pct);
        }
    }

    section("Data quality");
    if summary.data_quality.optional_inputs_used.is_empty() {
        println!("Based on required inputs only.");
    } else {
        println!(
            "Optional inputs used:   {}",
            summary.data_quality.optional_inputs_used.join(", ")
        );
    }
    if summary.data_quality.suggest_peak_executor_memory {
        print_info("Adding observed peak executor memory would sharpen the OOM risk check");
    }

    Ok(())
}
