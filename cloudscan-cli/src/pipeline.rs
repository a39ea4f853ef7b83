//! Scan pipeline
//!
//! One provider run end to end: inventory (fatal on any failure), cluster
//! enumeration, selection, per-cluster collection (degraded on failure),
//! CSV reports, terminal rendering.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::collector::{self, CollectorOptions};
use crate::output::{self, OutputFormat};
use crate::providers::CloudProvider;
use crate::report;
use crate::select::ClusterSelection;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub out_dir: PathBuf,
    pub format: OutputFormat,
    pub selection: ClusterSelection,
    pub max_parallel: usize,
    pub cluster_timeout: Duration,
}

pub async fn run(provider: Arc<dyn CloudProvider>, options: RunOptions) -> Result<()> {
    info!("Starting {} scan", provider.name());

    // All-or-nothing by design: a partial inventory would silently
    // under-report
    let inventory = provider.count_resources().await?;
    info!("Inventory complete: {} categories", inventory.len());

    let enumerated = provider.list_clusters().await?;
    let selected = options.selection.resolve(&enumerated)?;
    info!(
        "Scanning {} of {} clusters",
        selected.len(),
        enumerated.len()
    );

    let spinner = scan_spinner(selected.len());
    let summaries = collector::collect_clusters(
        Arc::clone(&provider),
        selected,
        &CollectorOptions {
            max_parallel: options.max_parallel,
            cluster_timeout: options.cluster_timeout,
        },
    )
    .await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    std::fs::create_dir_all(&options.out_dir)
        .with_context(|| format!("cannot create {}", options.out_dir.display()))?;
    let inventory_path = options.out_dir.join(provider.inventory_file());
    let cluster_path = options.out_dir.join(provider.cluster_data_file());
    report::write_inventory(&inventory, &inventory_path)?;
    report::write_cluster_data(&summaries, &cluster_path)?;

    output::print_inventory(&inventory, options.format)?;
    output::print_summaries(&summaries, options.format)?;

    let degraded = summaries.iter().filter(|s| !s.is_complete()).count();
    if degraded > 0 {
        output::print_warning(&format!(
            "{} cluster(s) could not be scanned and are reported as unknown",
            degraded
        ));
    }
    output::print_info(&format!(
        "Reports written to {} and {}",
        inventory_path.display(),
        cluster_path.display()
    ));
    output::print_success(&format!("{} scan complete", provider.name()));

    Ok(())
}

fn scan_spinner(cluster_count: usize) -> Option<indicatif::ProgressBar> {
    use std::io::IsTerminal;

    if cluster_count == 0 || !std::io::stderr().is_terminal() {
        return None;
    }

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_draw_target(indicatif::ProgressDrawTarget::stderr());
    spinner.set_message(format!("Scanning {} cluster(s)...", cluster_count));
    spinner.enable_steady_tick(Duration::from_millis(120));
    Some(spinner)
}
