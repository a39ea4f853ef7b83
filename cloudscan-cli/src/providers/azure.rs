//! Azure provider
//!
//! Talks to the Azure Resource Manager REST surface through the typed ARM
//! client. The subscription id is validated before any network call; cluster
//! access contexts come from listClusterUserCredential, one kubeconfig blob
//! per cluster per call.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cloudscan_common::retry::{retry_with_backoff, RetryConfig};
use cloudscan_common::{validation, ClusterRef, ResourceInventory, Result, ScanError};
use tracing::{debug, info};

use super::CloudProvider;
use crate::arm::{self, ArmClient, ArmResource, ClusterCredentialList, MANAGEMENT_BASE_URL};
use crate::kube_access;

const MANAGED_CLUSTERS_API_VERSION: &str = "2024-09-01";

/// The fixed inventory categories and their ARM list endpoints
const CATEGORIES: &[(&str, &str, &str)] = &[
    ("VMs", "Microsoft.Compute/virtualMachines", "2024-07-01"),
    ("Networks", "Microsoft.Network/virtualNetworks", "2024-05-01"),
    ("Storage Accounts", "Microsoft.Storage/storageAccounts", "2023-05-01"),
    (
        "AKS Clusters",
        "Microsoft.ContainerService/managedClusters",
        MANAGED_CLUSTERS_API_VERSION,
    ),
];

pub struct AzureProvider {
    arm: ArmClient,
    subscription: String,
    resource_group: Option<String>,
    retry: RetryConfig,
}

impl AzureProvider {
    /// Validate the subscription id, then authenticate with the
    /// client-credentials grant from the environment. Both failures are
    /// fatal for the run. An optional resource group narrows cluster
    /// enumeration; the inventory always covers the whole subscription.
    pub async fn connect(subscription: &str, resource_group: Option<String>) -> Result<Self> {
        validation::validate_subscription_id(subscription)?;
        if let Some(group) = &resource_group {
            validation::validate_cluster_name(group)?;
        }

        let tenant = require_env("AZURE_TENANT_ID")?;
        let client_id = require_env("AZURE_CLIENT_ID")?;
        let client_secret = require_env("AZURE_CLIENT_SECRET")?;

        let arm = ArmClient::authenticate(&tenant, &client_id, &client_secret)
            .await
            .map_err(|e| ScanError::Auth(format!("{:#}", e)))?;
        info!("Logged into Azure subscription {}", subscription);

        Ok(Self {
            arm,
            subscription: subscription.to_string(),
            resource_group,
            retry: RetryConfig::default(),
        })
    }

    fn list_url(&self, resource_type: &str, api_version: &str) -> String {
        format!(
            "{}/subscriptions/{}/providers/{}?api-version={}",
            MANAGEMENT_BASE_URL, self.subscription, resource_type, api_version
        )
    }

    fn clusters_url(&self) -> String {
        match &self.resource_group {
            Some(group) => format!(
                "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ContainerService/managedClusters?api-version={}",
                MANAGEMENT_BASE_URL, self.subscription, group, MANAGED_CLUSTERS_API_VERSION
            ),
            None => self.list_url(
                "Microsoft.ContainerService/managedClusters",
                MANAGED_CLUSTERS_API_VERSION,
            ),
        }
    }

    async fn count_category(&self, category: &str, url: &str) -> Result<u64> {
        let items: Vec<ArmResource> = self
            .arm
            .get_all(url)
            .await
            .map_err(|e| ScanError::inventory(category, format!("{:#}", e)))?;
        Ok(items.len() as u64)
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ScanError::Auth(format!("{} is not set in the environment", name)))
}

#[async_trait]
impl CloudProvider for AzureProvider {
    fn name(&self) -> &'static str {
        "azure"
    }

    fn inventory_file(&self) -> &'static str {
        "azure_inventory.csv"
    }

    fn cluster_data_file(&self) -> &'static str {
        "aks_data.csv"
    }

    async fn count_resources(&self) -> Result<ResourceInventory> {
        let mut inventory = ResourceInventory::new();

        for (category, resource_type, api_version) in CATEGORIES {
            let url = self.list_url(resource_type, api_version);
            let count = retry_with_backoff(&self.retry, category, || {
                self.count_category(category, &url)
            })
            .await?;
            inventory.add(*category, count);
        }

        Ok(inventory)
    }

    async fn list_clusters(&self) -> Result<Vec<ClusterRef>> {
        let url = self.clusters_url();
        let items: Vec<ArmResource> = self
            .arm
            .get_all(&url)
            .await
            .map_err(|e| ScanError::inventory("AKS Clusters", format!("{:#}", e)))?;

        let clusters = items
            .into_iter()
            .map(|r| ClusterRef {
                resource_group: arm::resource_group_from_id(&r.id),
                name: r.name,
            })
            .collect::<Vec<_>>();
        debug!("enumerated {} AKS clusters", clusters.len());
        Ok(clusters)
    }

    async fn cluster_client(&self, cluster: &ClusterRef) -> Result<kube::Client> {
        let resource_group = cluster.resource_group.as_deref().ok_or_else(|| {
            ScanError::cluster(&cluster.name, "no resource group known for cluster")
        })?;

        let url = format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.ContainerService/managedClusters/{}/listClusterUserCredential?api-version={}",
            MANAGEMENT_BASE_URL, self.subscription, resource_group, cluster.name,
            MANAGED_CLUSTERS_API_VERSION
        );

        let credentials: ClusterCredentialList = self
            .arm
            .post(&url)
            .await
            .map_err(|e| ScanError::cluster(&cluster.name, format!("{:#}", e)))?;

        let blob = credentials
            .kubeconfigs
            .first()
            .ok_or_else(|| ScanError::cluster(&cluster.name, "no kubeconfig returned"))?;

        let yaml = BASE64
            .decode(&blob.value)
            .map_err(|e| ScanError::cluster(&cluster.name, format!("kubeconfig decode: {}", e)))?;
        let yaml = String::from_utf8(yaml)
            .map_err(|e| ScanError::cluster(&cluster.name, format!("kubeconfig utf8: {}", e)))?;

        kube_access::client_from_kubeconfig_yaml(&yaml)
            .await
            .map_err(|e| ScanError::cluster(&cluster.name, format!("{:#}", e)))
    }
}
