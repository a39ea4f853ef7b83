//! CSV report writer
//!
//! Serializes the inventory and the per-cluster summaries to flat CSV files
//! with a header row and a stable field order. Destinations are overwritten
//! unconditionally; quoting of commas, quotes, and line breaks is handled by
//! the csv encoder. The header is written even when there are zero rows.

use std::path::Path;

use cloudscan_common::{ClusterSummary, ResourceInventory, ScanError};
use serde::Serialize;

pub const INVENTORY_HEADER: [&str; 2] = ["Resource Type", "Count"];
pub const CLUSTER_DATA_HEADER: [&str; 4] = ["Cluster Name", "Nodes", "Pods", "Containers"];

#[derive(Serialize)]
struct InventoryRow<'a> {
    resource_type: &'a str,
    count: u64,
}

#[derive(Serialize)]
struct ClusterRow<'a> {
    name: &'a str,
    nodes: String,
    pods: String,
    containers: String,
}

fn open_writer(path: &Path, header: &[&str]) -> Result<csv::Writer<std::fs::File>, ScanError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ScanError::Report(format!("cannot create {}: {}", path.display(), e)))?;
    writer
        .write_record(header)
        .map_err(|e| ScanError::Report(e.to_string()))?;
    Ok(writer)
}

/// Write `<provider>_inventory.csv`: header `Resource Type,Count`, one row
/// per category, in inventory order.
pub fn write_inventory(inventory: &ResourceInventory, path: &Path) -> Result<(), ScanError> {
    let mut writer = open_writer(path, &INVENTORY_HEADER)?;

    for count in inventory.iter() {
        writer
            .serialize(InventoryRow {
                resource_type: &count.resource_type,
                count: count.count,
            })
            .map_err(|e| ScanError::Report(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| ScanError::Report(e.to_string()))?;
    Ok(())
}

/// Write the cluster-scan CSV: header `Cluster Name,Nodes,Pods,Containers`,
/// one row per scanned cluster, in selection order. Failed clusters carry
/// the literal `unknown` in their count fields.
pub fn write_cluster_data(summaries: &[ClusterSummary], path: &Path) -> Result<(), ScanError> {
    let mut writer = open_writer(path, &CLUSTER_DATA_HEADER)?;

    for summary in summaries {
        writer
            .serialize(ClusterRow {
                name: &summary.name,
                nodes: summary.nodes.to_string(),
                pods: summary.pods.to_string(),
                containers: summary.containers.to_string(),
            })
            .map_err(|e| ScanError::Report(e.to_string()))?;
    }

    writer
        .flush()
        .map_err(|e| ScanError::Report(e.to_string()))?;
    Ok(())
}
