//! Infrastructure Cost Efficiency Analyzer CLI
//!
//! Runs cluster efficiency analyses against the analysis service, or
//! in-process with `--offline`, and prints tables or JSON.

mod backend;
mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use backend::{read_request, Backend, CatalogSource};
use output::OutputFormat;

/// Infrastructure Cost Efficiency Analyzer CLI
#[derive(Parser)]
#[command(name = "icea")]
#[command(author, version, about = "Spark cluster cost efficiency analyzer", long_about = None)]
pub struct Cli {
    /// Analysis service URL (falls back to the config file, then http://localhost:8000)
    #[arg(long, env = "ICEA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format (falls back to the config file, then table)
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args)]
pub struct RequestArgs {
    /// Path to a JSON analysis request, or `-` for stdin
    #[arg(long, short = 'i')]
    pub file: PathBuf,

    /// Run the analysis in this process instead of calling the service
    #[arg(long)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze executor packing, cost and waste for a cluster
    Analyze(RequestArgs),

    /// Project current and recommended monthly cost
    Forecast {
        #[command(flatten)]
        request: RequestArgs,

        /// Months to project (1-36)
        #[arg(long)]
        months: Option<u32>,

        /// Annual cost growth in percent
        #[arg(long, allow_hyphen_values = true)]
        growth: Option<f64>,
    },

    /// Full report: analysis, benchmark, what-if costs and forecast
    Summary(RequestArgs),

    /// Look up providers, regions and instance prices
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Check that the analysis service is up
    Health,

    /// Show or update the CLI config file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List providers with instance catalogs
    Providers {
        /// Use the built-in catalog instead of calling the service
        #[arg(long)]
        offline: bool,
    },

    /// List regions for a provider
    Regions {
        /// Provider id, e.g. aws
        #[arg(long)]
        cloud: String,

        #[arg(long)]
        offline: bool,
    },

    /// List instance types with hourly prices
    Instances {
        #[arg(long)]
        cloud: String,

        /// Region to price for; falls back to the default price
        #[arg(long)]
        region: Option<String>,

        #[arg(long)]
        offline: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Persist defaults to the config file
    Set {
        /// Default analysis service URL
        #[arg(long = "url")]
        url: Option<String>,

        /// Default output format
        #[arg(long = "default-format")]
        default_format: Option<OutputFormat>,
    },
}

impl RequestArgs {
    fn backend(&self, api_url: &str) -> Result<Backend> {
        if self.offline {
            Ok(Backend::offline())
        } else {
            Backend::remote(api_url)
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let file_config = config::Config::load()?;
    let api_url = file_config.resolve_api_url(cli.api_url.as_deref());
    let format = OutputFormat::resolve(cli.format, file_config.default_format.as_deref());

    match cli.command {
        Commands::Analyze(args) => {
            let request = read_request(&args.file)?;
            commands::analyze::run(&args.backend(&api_url)?, &request, format).await?;
        }
        Commands::Forecast {
            request: args,
            months,
            growth,
        } => {
            let request = read_request(&args.file)?;
            commands::forecast::run(&args.backend(&api_url)?, &request, months, growth, format)
                .await?;
        }
        Commands::Summary(args) => {
            let request = read_request(&args.file)?;
            commands::summary::run(&args.backend(&api_url)?, &request, format).await?;
        }
        Commands::Catalog(CatalogCommands::Providers { offline }) => {
            let source = CatalogSource::new(&api_url, offline)?;
            commands::catalog::providers(&source, format).await?;
        }
        Commands::Catalog(CatalogCommands::Regions { cloud, offline }) => {
            let source = CatalogSource::new(&api_url, offline)?;
            commands::catalog::regions(&source, &cloud, format).await?;
        }
        Commands::Catalog(CatalogCommands::Instances {
            cloud,
            region,
            offline,
        }) => {
            let source = CatalogSource::new(&api_url, offline)?;
            commands::catalog::instances(&source, &cloud, region.as_deref(), format).await?;
        }
        Commands::Health => {
            let client = client::ApiClient::new(&api_url)?;
            commands::health::run(&client, format).await?;
        }
        Commands::Config(ConfigCommands::Show) => {
            commands::config::show(&file_config, format)?;
        }
        Commands::Config(ConfigCommands::Set {
            url,
            default_format,
        }) => {
            commands::config::set(file_config, url, default_format)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
