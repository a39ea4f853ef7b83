//! Cloudscan library
//!
//! Inventories cloud resources for AWS and Azure, scans managed Kubernetes
//! clusters (EKS/AKS) for node/pod/container counts, and writes CSV reports.

pub mod arm;
pub mod collector;
pub mod config;
pub mod kube_access;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod providers;
pub mod report;
pub mod select;
