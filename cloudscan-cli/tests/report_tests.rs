//! Report Module Tests
//! Tests for the CSV report writers: headers, row order, quoting, and
//! degraded rows

use cloudscan::report::{write_cluster_data, write_inventory};
use cloudscan_common::{ClusterSummary, ResourceInventory};
use std::path::Path;

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

// ============== Inventory Report Tests ==============

#[test]
fn test_inventory_header_and_rows_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("azure_inventory.csv");

    let mut inventory = ResourceInventory::new();
    inventory.add("VMs", 3);
    inventory.add("Networks", 1);
    inventory.add("Storage Accounts", 0);
    inventory.add("AKS Clusters", 2);

    write_inventory(&inventory, &path).unwrap();

    let lines = read_lines(&path);
    assert_eq!(
        lines,
        vec![
            "Resource Type,Count",
            "VMs,3",
            "Networks,1",
            "Storage Accounts,0",
            "AKS Clusters,2",
        ]
    );
}

#[test]
fn test_empty_inventory_still_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aws_inventory.csv");

    write_inventory(&ResourceInventory::new(), &path).unwrap();

    assert_eq!(read_lines(&path), vec!["Resource Type,Count"]);
}

#[test]
fn test_inventory_overwrites_previous_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aws_inventory.csv");

    let mut first = ResourceInventory::new();
    first.add("EC2 Instances", 10);
    first.add("VPCs", 4);
    write_inventory(&first, &path).unwrap();

    let mut second = ResourceInventory::new();
    second.add("EC2 Instances", 7);
    write_inventory(&second, &path).unwrap();

    assert_eq!(read_lines(&path), vec!["Resource Type,Count", "EC2 Instances,7"]);
}

// ============== Cluster Data Report Tests ==============

#[test]
fn test_cluster_data_header_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eks_data.csv");

    let summaries = vec![
        ClusterSummary::new("prod-east", 5, 120, 180),
        ClusterSummary::new("staging", 2, 18, 25),
    ];
    write_cluster_data(&summaries, &path).unwrap();

    let lines = read_lines(&path);
    assert_eq!(
        lines,
        vec![
            "Cluster Name,Nodes,Pods,Containers",
            "prod-east,5,120,180",
            "staging,2,18,25",
        ]
    );
}

#[test]
fn test_degraded_cluster_writes_unknown_markers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aks_data.csv");

    let summaries = vec![
        ClusterSummary::new("healthy", 3, 40, 61),
        ClusterSummary::unknown("unreachable"),
    ];
    write_cluster_data(&summaries, &path).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines[2], "unreachable,unknown,unknown,unknown");
}

#[test]
fn test_cluster_name_with_comma_is_quoted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aks_data.csv");

    let summaries = vec![ClusterSummary::new("team-a, primary", 1, 2, 3)];
    write_cluster_data(&summaries, &path).unwrap();

    let lines = read_lines(&path);
    assert_eq!(lines[1], "\"team-a, primary\",1,2,3");

    // The quoted name must survive a round trip through a CSV reader
    let mut reader = csv::Reader::from_path(&path).unwrap();
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[0], "team-a, primary");
}

#[test]
fn test_no_clusters_still_writes_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eks_data.csv");

    write_cluster_data(&[], &path).unwrap();

    assert_eq!(read_lines(&path), vec!["Cluster Name,Nodes,Pods,Containers"]);
}
