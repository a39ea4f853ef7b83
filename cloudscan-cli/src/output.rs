//! Output formatting for CLI
//!
//! Renders the scan results on the terminal; the CSV files are written
//! separately by the report module.

use cloudscan_common::{ClusterSummary, ResourceInventory};
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct InventoryRow {
    #[tabled(rename = "RESOURCE TYPE")]
    resource_type: String,
    #[tabled(rename = "COUNT")]
    count: u64,
}

#[derive(Tabled, Serialize)]
struct ClusterRow {
    #[tabled(rename = "CLUSTER")]
    name: String,
    #[tabled(rename = "NODES")]
    nodes: String,
    #[tabled(rename = "PODS")]
    pods: String,
    #[tabled(rename = "CONTAINERS")]
    containers: String,
}

/// Print the resource inventory in the selected format
pub fn print_inventory(inventory: &ResourceInventory, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<InventoryRow> = inventory
        .iter()
        .map(|c| InventoryRow {
            resource_type: c.resource_type.clone(),
            count: c.count,
        })
        .collect();
    print_output(rows, format)
}

/// Print the per-cluster summaries in the selected format
pub fn print_summaries(summaries: &[ClusterSummary], format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<ClusterRow> = summaries
        .iter()
        .map(|s| ClusterRow {
            name: s.name.clone(),
            nodes: s.nodes.to_string(),
            pods: s.pods.to_string(),
            containers: s.containers.to_string(),
        })
        .collect();
    print_output(rows, format)
}

/// Print data in the specified format (table, JSON, or YAML)
fn print_output<T: Tabled + Serialize>(data: Vec<T>, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(&data)?,
        OutputFormat::Yaml => print_yaml(&data)?,
    }
    Ok(())
}

/// Print data as a table using the tabled crate
fn print_table<T: Tabled>(data: Vec<T>) {
    if data.is_empty() {
        println!("{}", "No results found".yellow());
        return;
    }

    let table = Table::new(data);
    println!("{}", table);
}

/// Print data as pretty-printed JSON
fn print_json<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
fn print_yaml<T: Serialize>(data: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    println!("{}", yaml);
    Ok(())
}

/// Print a success message with green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print an error message with red X
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message with blue i
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print a warning message with yellow triangle
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}
