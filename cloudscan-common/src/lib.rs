//! Common types and utilities shared between cloudscan crates

pub mod retry;
pub mod validation;

use serde::{Deserialize, Serialize};

/// A single counted resource category, e.g. "VMs" or "EKS Clusters"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCount {
    pub resource_type: String,
    pub count: u64,
}

/// Ordered set of resource counts for one provider account.
///
/// Built fresh each run, immutable once computed, written once to the
/// inventory report. Order is the provider's declared category order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInventory {
    counts: Vec<ResourceCount>,
}

impl ResourceInventory {
    pub fn new() -> Self {
        Self { counts: Vec::new() }
    }

    pub fn add(&mut self, resource_type: impl Into<String>, count: u64) {
        self.counts.push(ResourceCount {
            resource_type: resource_type.into(),
            count,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceCount> {
        self.counts.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// A count that may be unknown when the underlying query failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountValue {
    Known(u64),
    Unknown,
}

impl std::fmt::Display for CountValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{}", n),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Reference to a managed cluster as returned by the enumerator.
///
/// The resource group is only meaningful for providers that scope clusters
/// that way (AKS); it is `None` for EKS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

impl ClusterRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: None,
        }
    }

    pub fn with_resource_group(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_group: Some(group.into()),
        }
    }
}

/// Per-cluster scan result: node, pod, and container counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub name: String,
    pub nodes: CountValue,
    pub pods: CountValue,
    pub containers: CountValue,
}

impl ClusterSummary {
    pub fn new(name: impl Into<String>, nodes: u64, pods: u64, containers: u64) -> Self {
        Self {
            name: name.into(),
            nodes: CountValue::Known(nodes),
            pods: CountValue::Known(pods),
            containers: CountValue::Known(containers),
        }
    }

    /// Degraded summary for a cluster whose access or queries failed
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: CountValue::Unknown,
            pods: CountValue::Unknown,
            containers: CountValue::Unknown,
        }
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self.nodes, CountValue::Unknown)
            && !matches!(self.pods, CountValue::Unknown)
            && !matches!(self.containers, CountValue::Unknown)
    }
}

/// Scan error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Credential or login failure. Fatal for the run.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Malformed user-supplied identifier, raised before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A resource-listing query failed. Fatal: inventory is all-or-nothing.
    #[error("Inventory query failed for {category}: {message}")]
    Inventory { category: String, message: String },

    /// Per-cluster credential or query failure. Degrades that cluster only.
    #[error("Cluster '{cluster}' could not be scanned: {message}")]
    ClusterAccess { cluster: String, message: String },

    /// CSV serialization or IO failure
    #[error("Report write failed: {0}")]
    Report(String),
}

impl ScanError {
    pub fn inventory(category: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Inventory {
            category: category.into(),
            message: message.to_string(),
        }
    }

    pub fn cluster(cluster: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::ClusterAccess {
            cluster: cluster.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure is worth retrying with backoff.
    ///
    /// Auth and validation failures are never transient; listing and
    /// cluster-query failures are classified by error text since the
    /// underlying clients surface status through their messages.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Inventory { message, .. } | Self::ClusterAccess { message, .. } => {
                is_transient_message(message)
            }
            _ => false,
        }
    }
}

fn is_transient_message(message: &str) -> bool {
    let message = message.to_lowercase();
    const TRANSIENT_MARKERS: &[&str] = &[
        "timed out",
        "timeout",
        "connection reset",
        "connection refused",
        "dispatch failure",
        "temporarily unavailable",
        "too many requests",
        "429",
        "500",
        "502",
        "503",
        "504",
    ];
    TRANSIENT_MARKERS.iter().any(|m| message.contains(m))
}

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_preserves_insertion_order() {
        let mut inv = ResourceInventory::new();
        inv.add("VMs", 3);
        inv.add("Networks", 1);
        let types: Vec<&str> = inv.iter().map(|c| c.resource_type.as_str()).collect();
        assert_eq!(types, vec!["VMs", "Networks"]);
    }

    #[test]
    fn test_count_value_display() {
        assert_eq!(CountValue::Known(12).to_string(), "12");
        assert_eq!(CountValue::Known(0).to_string(), "0");
        assert_eq!(CountValue::Unknown.to_string(), "unknown");
    }

    #[test]
    fn test_unknown_summary_is_not_complete() {
        let ok = ClusterSummary::new("prod", 3, 40, 61);
        let bad = ClusterSummary::unknown("stale");
        assert!(ok.is_complete());
        assert!(!bad.is_complete());
        assert_eq!(bad.nodes, CountValue::Unknown);
    }

    #[test]
    fn test_transient_classification() {
        let transient = ScanError::inventory("VMs", "request timed out after 30s");
        let throttled = ScanError::cluster("prod", "HTTP status 503 Service Unavailable");
        let fatal = ScanError::Auth("missing credentials".to_string());
        let not_found = ScanError::inventory("VMs", "404 subscription not found");
        assert!(transient.is_transient());
        assert!(throttled.is_transient());
        assert!(!fatal.is_transient());
        assert!(!not_found.is_transient());
    }
}
