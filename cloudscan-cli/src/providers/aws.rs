//! AWS provider
//!
//! Session comes from the default credential chain (environment, profile,
//! IMDS) and is validated with one STS GetCallerIdentity call. Counts use
//! the SDK paginators so multi-page categories report true totals. EKS
//! cluster access is resolved from the local merged kubeconfig; the
//! kubeconfig's exec plugin does the per-cluster token exchange.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use cloudscan_common::retry::{retry_with_backoff, RetryConfig};
use cloudscan_common::{validation, ClusterRef, ResourceInventory, Result, ScanError};
use tracing::{debug, info};

use super::CloudProvider;
use crate::kube_access;

pub struct AwsProvider {
    ec2: aws_sdk_ec2::Client,
    s3: aws_sdk_s3::Client,
    eks: aws_sdk_eks::Client,
    retry: RetryConfig,
}

impl AwsProvider {
    /// Authenticate against AWS. An explicit region is validated before any
    /// network call; without one the default chain decides.
    pub async fn connect(region: Option<String>) -> Result<Self> {
        if let Some(region) = &region {
            validation::validate_aws_region(region)?;
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        let sts = aws_sdk_sts::Client::new(&config);
        let identity = sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| ScanError::Auth(e.to_string()))?;
        info!(
            "Logged into AWS as {}",
            identity.arn().unwrap_or("<unknown arn>")
        );

        Ok(Self {
            ec2: aws_sdk_ec2::Client::new(&config),
            s3: aws_sdk_s3::Client::new(&config),
            eks: aws_sdk_eks::Client::new(&config),
            retry: RetryConfig::default(),
        })
    }

    async fn count_instances(&self) -> Result<u64> {
        let mut pages = self.ec2.describe_instances().into_paginator().send();
        let mut total = 0u64;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ScanError::inventory("EC2 Instances", e))?;
            // A reservation can hold several instances; count the instances
            total += page
                .reservations()
                .iter()
                .map(|r| r.instances().len() as u64)
                .sum::<u64>();
        }
        Ok(total)
    }

    async fn count_vpcs(&self) -> Result<u64> {
        let mut pages = self.ec2.describe_vpcs().into_paginator().send();
        let mut total = 0u64;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ScanError::inventory("VPCs", e))?;
            total += page.vpcs().len() as u64;
        }
        Ok(total)
    }

    async fn count_buckets(&self) -> Result<u64> {
        let mut pages = self.s3.list_buckets().into_paginator().send();
        let mut total = 0u64;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ScanError::inventory("S3 Buckets", e))?;
            total += page.buckets().len() as u64;
        }
        Ok(total)
    }

    async fn count_clusters(&self) -> Result<u64> {
        let mut pages = self.eks.list_clusters().into_paginator().send();
        let mut total = 0u64;
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ScanError::inventory("EKS Clusters", e))?;
            total += page.clusters().len() as u64;
        }
        Ok(total)
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn name(&self) -> &'static str {
        "aws"
    }

    fn inventory_file(&self) -> &'static str {
        "aws_inventory.csv"
    }

    fn cluster_data_file(&self) -> &'static str {
        "eks_data.csv"
    }

    async fn count_resources(&self) -> Result<ResourceInventory> {
        let mut inventory = ResourceInventory::new();

        let instances = retry_with_backoff(&self.retry, "count EC2 instances", || {
            self.count_instances()
        })
        .await?;
        inventory.add("EC2 Instances", instances);

        let vpcs = retry_with_backoff(&self.retry, "count VPCs", || self.count_vpcs()).await?;
        inventory.add("VPCs", vpcs);

        let buckets =
            retry_with_backoff(&self.retry, "count S3 buckets", || self.count_buckets()).await?;
        inventory.add("S3 Buckets", buckets);

        let clusters =
            retry_with_backoff(&self.retry, "count EKS clusters", || self.count_clusters())
                .await?;
        inventory.add("EKS Clusters", clusters);

        Ok(inventory)
    }

    async fn list_clusters(&self) -> Result<Vec<ClusterRef>> {
        let mut pages = self.eks.list_clusters().into_paginator().send();
        let mut clusters = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| ScanError::inventory("EKS Clusters", e))?;
            clusters.extend(page.clusters().iter().map(ClusterRef::new));
        }
        debug!("enumerated {} EKS clusters", clusters.len());
        Ok(clusters)
    }

    async fn cluster_client(&self, cluster: &ClusterRef) -> Result<kube::Client> {
        // The ARN disambiguates same-named clusters across regions in the
        // merged kubeconfig
        let arn = self
            .eks
            .describe_cluster()
            .name(&cluster.name)
            .send()
            .await
            .map_err(|e| ScanError::cluster(&cluster.name, e))?
            .cluster
            .and_then(|c| c.arn);

        kube_access::client_from_local_context(&cluster.name, arn.as_deref())
            .await
            .map_err(|e| ScanError::cluster(&cluster.name, format!("{:#}", e)))
    }
}
