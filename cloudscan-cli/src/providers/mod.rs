//! Cloud provider abstraction
//!
//! One trait covers both providers: authenticate at construction, count a
//! fixed set of resource categories, enumerate managed clusters, and hand
//! out a per-cluster Kubernetes client. The pipeline and collector only see
//! this seam.

pub mod aws;
pub mod azure;

use async_trait::async_trait;
use cloudscan_common::{ClusterRef, ResourceInventory, Result};

pub use aws::AwsProvider;
pub use azure::AzureProvider;

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Short provider tag used in log lines and file names ("aws", "azure")
    fn name(&self) -> &'static str;

    /// File name for the inventory CSV
    fn inventory_file(&self) -> &'static str;

    /// File name for the cluster-scan CSV
    fn cluster_data_file(&self) -> &'static str;

    /// Count every resource category. All-or-nothing: one failed category
    /// fails the whole inventory.
    async fn count_resources(&self) -> Result<ResourceInventory>;

    /// Enumerate managed Kubernetes clusters visible to the session
    async fn list_clusters(&self) -> Result<Vec<ClusterRef>>;

    /// Resolve a short-lived access context for one cluster. The returned
    /// client is owned by the caller; implementations must not share or
    /// mutate process-global state to build it.
    async fn cluster_client(&self, cluster: &ClusterRef) -> Result<kube::Client>;
}
