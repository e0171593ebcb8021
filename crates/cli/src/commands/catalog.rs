//! `icea catalog`: providers, regions and instance prices

use anyhow::Result;
use colored::Colorize;
use icea_lib::{CatalogEntry, InstanceType};
use tabled::Tabled;

use crate::backend::CatalogSource;
use crate::output::{format_gb, print_json, print_warning, OutputFormat};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Instance")]
    id: String,
    #[tabled(rename = "Cores")]
    cores: u32,
    #[tabled(rename = "Memory")]
    memory: String,
    #[tabled(rename = "Hourly")]
    hourly: String,
}

impl From<&InstanceType> for InstanceRow {
    fn from(i: &InstanceType) -> Self {
        Self {
            id: i.id.clone(),
            cores: i.cores,
            memory: format_gb(i.memory_gb),
            hourly: format!("${:.4}", i.hourly_usd),
        }
    }
}

fn render_entries(title: &str, entries: &[CatalogEntry]) {
    println!("{}", title.bold());
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: e.id.clone(),
            name: e.name.clone(),
        })
        .collect();
    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    println!("{}", table);
}

pub async fn providers(source: &CatalogSource, format: OutputFormat) -> Result<()> {
    let providers = source.providers().await?;

    match format {
        OutputFormat::Json => print_json(&providers)?,
        OutputFormat::Table => render_entries("Providers", &providers),
    }

    Ok(())
}

pub async fn regions(source: &CatalogSource, cloud: &str, format: OutputFormat) -> Result<()> {
    let regions = source.regions(cloud).await?;

    match format {
        OutputFormat::Json => print_json(&regions)?,
        OutputFormat::Table if regions.is_empty() => {
            print_warning(&format!("No regions listed for '{}'", cloud))
        }
        OutputFormat::Table => render_entries(&format!("Regions ({})", cloud), &regions),
    }

    Ok(())
}

pub async fn instances(
    source: &CatalogSource,
    cloud: &str,
    region: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let instances = source.instances(cloud, region).await?;

    match format {
        OutputFormat::Json => print_json(&instances)?,
        OutputFormat::Table if instances.is_empty() => {
            print_warning(&format!("No instance types listed for '{}'", cloud))
        }
        OutputFormat::Table => {
            println!(
                "{} {}",
                format!("Instance types ({})", cloud).bold(),
                region.map(|r| format!("priced for {}", r)).unwrap_or_default()
            );
            let rows: Vec<InstanceRow> = instances.iter().map(InstanceRow::from).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
