//! Cluster selection
//!
//! Three modes behind one contract: scan everything the enumerator returned,
//! scan an explicit list (validated against the enumerated set), or build the
//! list interactively with a `done` sentinel.

use cloudscan_common::{validation, ClusterRef, Result, ScanError};
use tracing::info;

pub const DONE_SENTINEL: &str = "done";

/// How the clusters to scan are chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterSelection {
    /// Scan every enumerated cluster (default)
    All,
    /// Scan a fixed list of cluster names
    Named(Vec<String>),
    /// Prompt for names one at a time, terminated by `done`
    Interactive,
}

impl ClusterSelection {
    /// Parse the `--clusters` argument: `all`, `interactive`, or a comma
    /// separated list of names.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "interactive" => Ok(Self::Interactive),
            _ => {
                let names: Vec<String> = s
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err(ScanError::InvalidInput(
                        "cluster selection cannot be empty".to_string(),
                    ));
                }
                for name in &names {
                    validation::validate_cluster_name(name)?;
                }
                Ok(Self::Named(names))
            }
        }
    }

    /// Resolve the selection against the enumerated clusters, preserving
    /// enumeration order for `All` and selection order otherwise.
    pub fn resolve(&self, enumerated: &[ClusterRef]) -> Result<Vec<ClusterRef>> {
        match self {
            Self::All => Ok(enumerated.to_vec()),
            Self::Named(names) => resolve_named(names, enumerated),
            Self::Interactive => resolve_interactive(enumerated),
        }
    }
}

/// Match each requested name against the enumerated set. An unknown name is
/// fatal: scanning a cluster the account cannot see would silently succeed
/// with an empty report otherwise.
pub fn resolve_named(names: &[String], enumerated: &[ClusterRef]) -> Result<Vec<ClusterRef>> {
    names
        .iter()
        .map(|name| {
            enumerated
                .iter()
                .find(|c| &c.name == name)
                .cloned()
                .ok_or_else(|| {
                    ScanError::InvalidInput(format!(
                        "cluster '{}' is not visible to this account",
                        name
                    ))
                })
        })
        .collect()
}

/// Outcome of one interactive prompt answer
#[derive(Debug, PartialEq, Eq)]
pub enum Candidate {
    Done,
    Accepted(ClusterRef),
    Rejected(String),
}

/// Classify one line of interactive input against the enumerated set
pub fn classify_candidate(input: &str, enumerated: &[ClusterRef]) -> Candidate {
    let input = input.trim();
    if input.eq_ignore_ascii_case(DONE_SENTINEL) {
        return Candidate::Done;
    }
    match enumerated.iter().find(|c| c.name == input) {
        Some(cluster) => Candidate::Accepted(cluster.clone()),
        None => Candidate::Rejected(input.to_string()),
    }
}

fn resolve_interactive(enumerated: &[ClusterRef]) -> Result<Vec<ClusterRef>> {
    use dialoguer::Input;

    info!("{} clusters enumerated", enumerated.len());
    let mut selected = Vec::new();

    loop {
        let answer: String = Input::new()
            .with_prompt(format!(
                "Cluster to scan ('{}' to finish)",
                DONE_SENTINEL
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ScanError::InvalidInput(format!("prompt failed: {}", e)))?;

        match classify_candidate(&answer, enumerated) {
            Candidate::Done => break,
            Candidate::Accepted(cluster) => {
                crate::output::print_success(&format!("added '{}'", cluster.name));
                selected.push(cluster);
            }
            Candidate::Rejected(name) => {
                crate::output::print_warning(&format!(
                    "'{}' is not an enumerated cluster, try again",
                    name
                ));
            }
        }
    }

    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enumerated() -> Vec<ClusterRef> {
        vec![
            ClusterRef::with_resource_group("prod", "rg-prod"),
            ClusterRef::new("staging"),
        ]
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(ClusterSelection::parse("all").unwrap(), ClusterSelection::All);
        assert_eq!(
            ClusterSelection::parse("Interactive").unwrap(),
            ClusterSelection::Interactive
        );
        assert_eq!(
            ClusterSelection::parse("prod, staging").unwrap(),
            ClusterSelection::Named(vec!["prod".to_string(), "staging".to_string()])
        );
        assert!(ClusterSelection::parse(",").is_err());
        assert!(ClusterSelection::parse("bad name!").is_err());
    }

    #[test]
    fn test_resolve_named_preserves_selection_order() {
        let resolved = resolve_named(
            &["staging".to_string(), "prod".to_string()],
            &enumerated(),
        )
        .unwrap();
        let names: Vec<&str> = resolved.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["staging", "prod"]);
        // resource group survives resolution
        assert_eq!(resolved[1].resource_group.as_deref(), Some("rg-prod"));
    }

    #[test]
    fn test_resolve_named_rejects_unknown_cluster() {
        let err = resolve_named(&["ghost".to_string()], &enumerated()).unwrap_err();
        assert!(matches!(err, ScanError::InvalidInput(_)));
    }

    #[test]
    fn test_classify_candidate() {
        let set = enumerated();
        assert_eq!(classify_candidate("done", &set), Candidate::Done);
        assert_eq!(classify_candidate("DONE", &set), Candidate::Done);
        assert_eq!(
            classify_candidate(" prod ", &set),
            Candidate::Accepted(set[0].clone())
        );
        assert_eq!(
            classify_candidate("ghost", &set),
            Candidate::Rejected("ghost".to_string())
        );
    }
}
