//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    /// Flag first, then the config file value, then table
    pub fn resolve(flag: Option<OutputFormat>, configured: Option<&str>) -> OutputFormat {
        flag.or_else(|| configured.and_then(|s| OutputFormat::from_str(s, true).ok()))
            .unwrap_or_default()
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "-".repeat(50));
}

/// 1234.5 -> "$1,234.50"
pub fn format_usd(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round_ties_even() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Fraction as a percentage with one decimal
pub fn format_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn format_gb(gb: f64) -> String {
    if gb.fract() == 0.0 {
        format!("{:.0} GB", gb)
    } else {
        format!("{:.1} GB", gb)
    }
}

/// Efficiency score colored by band
pub fn color_score(score: u32) -> String {
    let formatted = format!("{}/100", score);
    if score >= 80 {
        formatted.green().to_string()
    } else if score >= 50 {
        formatted.yellow().to_string()
    } else {
        formatted.red().to_string()
    }
}

pub fn color_savings(amount: f64) -> String {
    let formatted = format_usd(amount);
    if amount > 0.0 {
        formatted.green().bold().to_string()
    } else {
        formatted.dimmed().to_string()
    }
}

pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "ok" | "healthy" => status.green().to_string(),
        "degraded" => status.yellow().to_string(),
        "unhealthy" | "error" => status.red().to_string(),
        _ => status.to_string(),
    }
}
