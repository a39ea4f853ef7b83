//! Per-cluster Kubernetes access contexts
//!
//! Builds an owned kube Client for one cluster at a time, either from a
//! kubeconfig blob handed back by the provider (AKS) or from the matching
//! context in the local merged kubeconfig (EKS, where the kubeconfig's exec
//! plugin performs the scoped credential exchange). Nothing here touches
//! KUBECONFIG or any other shared process state.

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Create a client from a kubeconfig YAML document, using its current
/// context
pub async fn client_from_kubeconfig_yaml(yaml: &str) -> Result<Client> {
    let kubeconfig = Kubeconfig::from_yaml(yaml).context("failed to parse kubeconfig")?;
    client_for_context(kubeconfig, None).await
}

/// Create a client for the named cluster out of the local merged kubeconfig
/// (KUBECONFIG paths or ~/.kube/config, merged read-only)
pub async fn client_from_local_context(cluster_name: &str, arn: Option<&str>) -> Result<Client> {
    let kubeconfig = Kubeconfig::read().context("failed to read local kubeconfig")?;
    let context = find_context(&kubeconfig, cluster_name, arn).with_context(|| {
        format!(
            "no kubeconfig context found for cluster '{}'; run `aws eks update-kubeconfig --name {}` first",
            cluster_name, cluster_name
        )
    })?;
    client_for_context(kubeconfig, Some(context)).await
}

async fn client_for_context(kubeconfig: Kubeconfig, context: Option<String>) -> Result<Client> {
    let config = Config::from_custom_kubeconfig(
        kubeconfig,
        &KubeConfigOptions {
            context,
            ..Default::default()
        },
    )
    .await
    .context("failed to build client config from kubeconfig")?;

    Client::try_from(config).context("failed to create Kubernetes client")
}

/// Find the kubeconfig context for a cluster, matching (in order) the
/// context name against the cluster ARN, the plain cluster name, and an
/// ARN-style suffix, then falling back to contexts whose cluster entry
/// matches. `aws eks update-kubeconfig` names contexts after the ARN, so
/// the first rule covers the common case.
pub fn find_context(kubeconfig: &Kubeconfig, cluster_name: &str, arn: Option<&str>) -> Option<String> {
    let by_name = |candidate: &str| -> bool {
        if let Some(arn) = arn {
            if candidate == arn {
                return true;
            }
        }
        candidate == cluster_name || candidate.ends_with(&format!("cluster/{}", cluster_name))
    };

    if let Some(context) = kubeconfig.contexts.iter().find(|c| by_name(&c.name)) {
        return Some(context.name.clone());
    }

    kubeconfig
        .contexts
        .iter()
        .find(|c| {
            c.context
                .as_ref()
                .map(|ctx| by_name(&ctx.cluster))
                .unwrap_or(false)
        })
        .map(|c| c.name.clone())
}
