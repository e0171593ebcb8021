//! `icea config`: inspect and update the CLI config file

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{Config, DEFAULT_API_URL};
use crate::output::{print_json, print_success, OutputFormat};

pub fn show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Table => {
            println!("Config file:            {}", Config::config_path()?.display());
            println!(
                "API URL:                {}",
                config
                    .api_url
                    .as_deref()
                    .map(|u| u.cyan().to_string())
                    .unwrap_or_else(|| format!("{} (default)", DEFAULT_API_URL).dimmed().to_string())
            );
            println!(
                "Default format:         {}",
                config.default_format.as_deref().unwrap_or("table")
            );
        }
    }
    Ok(())
}

pub fn set(mut config: Config, api_url: Option<String>, format: Option<OutputFormat>) -> Result<()> {
    if let Some(url) = api_url {
        url::Url::parse(&url).with_context(|| format!("Invalid API URL: {}", url))?;
        config.api_url = Some(url);
    }
    if let Some(format) = format {
        config.default_format = Some(
            match format {
                OutputFormat::Table => "table",
                OutputFormat::Json => "json",
            }
            .to_string(),
        );
    }

    let path = config.save()?;
    print_success(&format!("Saved {}", path.display()));
    Ok(())
}
