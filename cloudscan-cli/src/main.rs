//! Cloudscan CLI
//!
//! Command-line interface for cloud resource inventory and managed-cluster
//! scanning (AWS/EKS, Azure/AKS)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cloudscan::config::Config;
use cloudscan::output::{self, OutputFormat};
use cloudscan::pipeline::{self, RunOptions};
use cloudscan::providers::{AwsProvider, AzureProvider, CloudProvider};
use cloudscan::logging;
use cloudscan::select::ClusterSelection;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inventory AWS resources and scan EKS clusters
    Aws {
        /// AWS region (default: credential chain / profile region)
        #[arg(short, long)]
        region: Option<String>,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Inventory Azure resources and scan AKS clusters
    Azure {
        /// Azure subscription id
        #[arg(short, long)]
        subscription: Option<String>,
        /// Limit cluster scanning to one resource group
        #[arg(short = 'g', long)]
        resource_group: Option<String>,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Clusters to scan: 'all', 'interactive', or a comma-separated list
    #[arg(short, long)]
    clusters: Option<String>,

    /// Directory the CSV reports are written to
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Parallel cluster scans
    #[arg(long)]
    max_parallel: Option<usize>,

    /// Per-cluster timeout in seconds
    #[arg(long)]
    cluster_timeout: Option<u64>,
}

impl ScanArgs {
    fn into_run_options(self, cli_output: Option<&str>, config: &Config) -> Result<RunOptions> {
        let selection = ClusterSelection::parse(
            self.clusters.as_deref().unwrap_or(&config.clusters),
        )?;
        let format = OutputFormat::from_str(cli_output.unwrap_or(&config.default_output));
        Ok(RunOptions {
            out_dir: self
                .out_dir
                .unwrap_or_else(|| PathBuf::from(&config.out_dir)),
            format,
            selection,
            max_parallel: self.max_parallel.unwrap_or(config.max_parallel),
            cluster_timeout: Duration::from_secs(
                self.cluster_timeout.unwrap_or(config.cluster_timeout_secs),
            ),
        })
    }
}

#[tokio::main]
async fn main() {
    logging::init("info");

    if let Err(err) = run().await {
        tracing::error!("{:#}", err);
        output::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load config defaults; flags win
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("ignoring config file: {:#}", err);
            Config::default()
        }
    };

    match cli.command {
        Commands::Aws { region, scan } => {
            let options = scan.into_run_options(cli.output.as_deref(), &config)?;
            let region = region.or_else(|| config.aws.region.clone());
            let provider: Arc<dyn CloudProvider> = Arc::new(AwsProvider::connect(region).await?);
            pipeline::run(provider, options).await
        }
        Commands::Azure {
            subscription,
            resource_group,
            scan,
        } => {
            let options = scan.into_run_options(cli.output.as_deref(), &config)?;
            let subscription = subscription
                .or_else(|| config.azure.subscription.clone())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "no subscription id given (use --subscription or set azure.subscription in {})",
                        "~/.config/cloudscan/cli.toml"
                    )
                })?;
            let provider: Arc<dyn CloudProvider> =
                Arc::new(AzureProvider::connect(&subscription, resource_group).await?);
            pipeline::run(provider, options).await
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
            Ok(())
        }
    }
}

/// Generate shell completions
fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());
}
