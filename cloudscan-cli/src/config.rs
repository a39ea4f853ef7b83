//! CLI configuration management
//!
//! Optional defaults loaded from ~/.config/cloudscan/cli.toml; command-line
//! flags always win over file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the CSV reports are written to
    pub out_dir: String,
    /// Default terminal output format (table, json, yaml)
    pub default_output: String,
    /// Bounded worker pool size for cluster scans
    pub max_parallel: usize,
    /// Per-cluster scan timeout in seconds
    pub cluster_timeout_secs: u64,
    /// Default cluster selection (all, interactive, or a comma list)
    pub clusters: String,
    pub aws: AwsDefaults,
    pub azure: AzureDefaults,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AwsDefaults {
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AzureDefaults {
    pub subscription: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: ".".to_string(),
            default_output: "table".to_string(),
            max_parallel: 4,
            cluster_timeout_secs: 120,
            clusters: "all".to_string(),
            aws: AwsDefaults::default(),
            azure: AzureDefaults::default(),
        }
    }
}

impl Config {
    /// Load the config file; a missing file yields the defaults, an
    /// unreadable or malformed one is an error.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/cloudscan/cli.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.cluster_timeout_secs, 120);
        assert_eq!(config.clusters, "all");
        assert!(config.azure.subscription.is_none());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            max_parallel = 8

            [azure]
            subscription = "12345678-1234-1234-1234-123456789abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_parallel, 8);
        assert_eq!(config.default_output, "table");
        assert_eq!(
            config.azure.subscription.as_deref(),
            Some("12345678-1234-1234-1234-123456789abc")
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("cli.toml")).unwrap();
        assert_eq!(config.max_parallel, 4);
        assert_eq!(config.clusters, "all");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.toml");
        std::fs::write(&path, "max_parallel = \"not a number\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("invalid config file"));
    }
}
