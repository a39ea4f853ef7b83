//! Cluster data collector
//!
//! For each selected cluster: resolve an access context, then count nodes,
//! pods, and containers by listing objects through the API. One bad cluster
//! degrades to `unknown` counts instead of failing the batch. Scans fan out
//! over a bounded worker pool and results come back in selection order.

use std::sync::Arc;
use std::time::Duration;

use cloudscan_common::{ClusterRef, ClusterSummary};
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, ListParams};
use kube::core::ObjectList;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::providers::CloudProvider;

/// Objects requested per list page. Totals are correct for any cluster
/// size; the limit only bounds response sizes.
const PAGE_LIMIT: u32 = 500;

#[derive(Debug, Clone)]
pub struct CollectorOptions {
    pub max_parallel: usize,
    pub cluster_timeout: Duration,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            max_parallel: 4,
            cluster_timeout: Duration::from_secs(120),
        }
    }
}

/// Scan every selected cluster with bounded parallelism. The output vector
/// lines up with `clusters`: index i is the summary for clusters[i].
pub async fn collect_clusters(
    provider: Arc<dyn CloudProvider>,
    clusters: Vec<ClusterRef>,
    options: &CollectorOptions,
) -> Vec<ClusterSummary> {
    let semaphore = Arc::new(Semaphore::new(options.max_parallel.max(1)));
    let timeout = options.cluster_timeout;
    let mut join_set = JoinSet::new();

    for (index, cluster) in clusters.iter().cloned().enumerate() {
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);

        join_set.spawn(async move {
            // acquire only fails once the semaphore is closed, which never
            // happens here
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            let summary = collect_one(provider.as_ref(), &cluster, timeout).await;
            (index, summary)
        });
    }

    let mut summaries: Vec<Option<ClusterSummary>> = vec![None; clusters.len()];
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok((index, summary)) => summaries[index] = Some(summary),
            Err(e) => warn!("cluster scan task panicked: {}", e),
        }
    }

    // A panicked task leaves its slot empty; report it as unknown rather
    // than dropping the row
    summaries
        .into_iter()
        .enumerate()
        .map(|(i, s)| s.unwrap_or_else(|| ClusterSummary::unknown(&clusters[i].name)))
        .collect()
}

/// Scan one cluster under a timeout. Never fails: access or query errors
/// yield a degraded summary.
pub async fn collect_one(
    provider: &dyn CloudProvider,
    cluster: &ClusterRef,
    timeout: Duration,
) -> ClusterSummary {
    match tokio::time::timeout(timeout, scan_cluster(provider, cluster)).await {
        Ok(Ok(summary)) => summary,
        Ok(Err(e)) => {
            warn!("cluster '{}' degraded to unknown: {}", cluster.name, e);
            ClusterSummary::unknown(&cluster.name)
        }
        Err(_) => {
            warn!(
                "cluster '{}' timed out after {:?}, degraded to unknown",
                cluster.name, timeout
            );
            ClusterSummary::unknown(&cluster.name)
        }
    }
}

async fn scan_cluster(
    provider: &dyn CloudProvider,
    cluster: &ClusterRef,
) -> cloudscan_common::Result<ClusterSummary> {
    let client = provider.cluster_client(cluster).await?;

    let nodes = count_nodes(client.clone())
        .await
        .map_err(|e| cloudscan_common::ScanError::cluster(&cluster.name, e))?;
    let (pods, containers) = count_pods_and_containers(client)
        .await
        .map_err(|e| cloudscan_common::ScanError::cluster(&cluster.name, e))?;

    info!(
        "cluster '{}': {} nodes, {} pods, {} containers",
        cluster.name, nodes, pods, containers
    );
    Ok(ClusterSummary::new(&cluster.name, nodes, pods, containers))
}

/// Count nodes by listing them page by page. An empty cluster yields zero.
async fn count_nodes(client: kube::Client) -> Result<u64, kube::Error> {
    let nodes: Api<Node> = Api::all(client);
    let mut total = 0u64;
    let mut continue_token: Option<String> = None;

    loop {
        let page = nodes.list(&page_params(continue_token.as_deref())).await?;
        continue_token = accumulate_page(&page, &mut total);
        if continue_token.is_none() {
            return Ok(total);
        }
    }
}

/// Count pods across all namespaces and sum their container statuses
async fn count_pods_and_containers(client: kube::Client) -> Result<(u64, u64), kube::Error> {
    let pods: Api<Pod> = Api::all(client);
    let mut pod_total = 0u64;
    let mut container_total = 0u64;
    let mut continue_token: Option<String> = None;

    loop {
        let page = pods.list(&page_params(continue_token.as_deref())).await?;
        container_total += container_count(&page.items);
        continue_token = accumulate_page(&page, &mut pod_total);
        if continue_token.is_none() {
            return Ok((pod_total, container_total));
        }
    }
}

fn page_params(continue_token: Option<&str>) -> ListParams {
    let params = ListParams::default().limit(PAGE_LIMIT);
    match continue_token {
        Some(token) => params.continue_token(token),
        None => params,
    }
}

/// Fold one list page into the running total, returning the continue token
/// for the next page. The API signals the last page with a missing or empty
/// token.
fn accumulate_page<T: Clone>(page: &ObjectList<T>, total: &mut u64) -> Option<String> {
    *total += page.items.len() as u64;
    page.metadata.continue_.clone().filter(|t| !t.is_empty())
}

/// Containers are the entries in `status.containerStatuses`, summed over
/// pods. Init and ephemeral containers are not counted.
pub fn container_count(pods: &[Pod]) -> u64 {
    pods.iter()
        .map(|pod| {
            pod.status
                .as_ref()
                .and_then(|s| s.container_statuses.as_ref())
                .map(|cs| cs.len() as u64)
                .unwrap_or(0)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;

    fn pod_with_containers(count: usize) -> Pod {
        let statuses = (0..count)
            .map(|i| ContainerStatus {
                name: format!("c{}", i),
                ..Default::default()
            })
            .collect();
        Pod {
            status: Some(PodStatus {
                container_statuses: Some(statuses),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_container_count_sums_statuses() {
        let pods = vec![pod_with_containers(2), pod_with_containers(3)];
        assert_eq!(container_count(&pods), 5);
    }

    #[test]
    fn test_container_count_zero_pods() {
        assert_eq!(container_count(&[]), 0);
    }

    #[test]
    fn test_container_count_pod_without_status() {
        let pods = vec![Pod::default(), pod_with_containers(1)];
        assert_eq!(container_count(&pods), 1);
    }

    fn page_of(items: usize, token: Option<&str>) -> ObjectList<Pod> {
        ObjectList {
            types: Default::default(),
            metadata: ListMeta {
                continue_: token.map(str::to_string),
                ..Default::default()
            },
            items: (0..items).map(|_| Pod::default()).collect(),
        }
    }

    #[test]
    fn test_accumulate_page_spans_page_boundary() {
        // limit 2 with 3 items: the third arrives on a second page and must
        // survive the boundary
        let mut total = 0u64;
        let token = accumulate_page(&page_of(2, Some("next")), &mut total);
        assert_eq!(token.as_deref(), Some("next"));
        let token = accumulate_page(&page_of(1, None), &mut total);
        assert!(token.is_none());
        assert_eq!(total, 3);
    }

    #[test]
    fn test_accumulate_page_treats_empty_token_as_last() {
        let mut total = 0u64;
        let token = accumulate_page(&page_of(1, Some("")), &mut total);
        assert!(token.is_none());
        assert_eq!(total, 1);
    }
}
