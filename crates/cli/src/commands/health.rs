//! `icea health`: check that the analysis service is reachable

use anyhow::Result;

use crate::client::ApiClient;
use crate::output::{color_status, print_json, print_success, OutputFormat};

pub async fn run(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => print_success(&format!(
            "{} at {} is {}",
            health.service,
            client.base_url(),
            color_status(&health.status)
        )),
    }

    Ok(())
}
