//! Input validation for user-supplied identifiers
//!
//! Everything here runs before any network call is attempted.

use regex::Regex;
use std::sync::LazyLock;

use crate::ScanError;

pub const MAX_CLUSTER_NAME_LENGTH: usize = 100;

/// Canonical subscription id form: 8-4-4-4-12 hex, case-insensitive
static SUBSCRIPTION_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

/// AWS region form, e.g. us-east-1, ap-southeast-2
static AWS_REGION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d$").unwrap());

/// Cluster and resource-group names as accepted by both providers
static CLUSTER_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_.-]*$").unwrap());

/// Validation result type
pub type ValidationResult<T> = Result<T, ScanError>;

pub fn validate_subscription_id(id: &str) -> ValidationResult<()> {
    if !SUBSCRIPTION_ID_REGEX.is_match(id) {
        return Err(ScanError::InvalidInput(format!(
            "subscription id '{}' is not a valid UUID",
            id
        )));
    }
    Ok(())
}

pub fn validate_aws_region(region: &str) -> ValidationResult<()> {
    if !AWS_REGION_REGEX.is_match(region) {
        return Err(ScanError::InvalidInput(format!(
            "'{}' is not a valid AWS region name",
            region
        )));
    }
    Ok(())
}

pub fn validate_cluster_name(name: &str) -> ValidationResult<()> {
    if name.is_empty() {
        return Err(ScanError::InvalidInput(
            "cluster name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_CLUSTER_NAME_LENGTH {
        return Err(ScanError::InvalidInput(format!(
            "cluster name too long (max {} characters)",
            MAX_CLUSTER_NAME_LENGTH
        )));
    }
    if !CLUSTER_NAME_REGEX.is_match(name) {
        return Err(ScanError::InvalidInput(format!(
            "cluster name '{}' contains invalid characters",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_subscription_id() {
        assert!(validate_subscription_id("12345678-1234-1234-1234-123456789abc").is_ok());
        assert!(validate_subscription_id("ABCDEF01-2345-6789-ABCD-EF0123456789").is_ok());
        assert!(validate_subscription_id("").is_err());
        assert!(validate_subscription_id("not-a-uuid").is_err());
        assert!(validate_subscription_id("12345678-1234-1234-1234-123456789ab").is_err()); // Too short
        assert!(validate_subscription_id("12345678123412341234123456789abc").is_err()); // No dashes
    }

    #[test]
    fn test_validate_aws_region() {
        assert!(validate_aws_region("us-east-1").is_ok());
        assert!(validate_aws_region("ap-southeast-2").is_ok());
        assert!(validate_aws_region("us-gov-west-1").is_ok());
        assert!(validate_aws_region("").is_err());
        assert!(validate_aws_region("useast1").is_err());
        assert!(validate_aws_region("US-EAST-1").is_err());
        assert!(validate_aws_region("us-east-").is_err());
    }

    #[test]
    fn test_validate_cluster_name() {
        assert!(validate_cluster_name("prod-cluster-01").is_ok());
        assert!(validate_cluster_name("staging.eu").is_ok());
        assert!(validate_cluster_name("").is_err());
        assert!(validate_cluster_name("-leading-dash").is_err());
        assert!(validate_cluster_name("name with spaces").is_err());
        assert!(validate_cluster_name(&"x".repeat(MAX_CLUSTER_NAME_LENGTH + 1)).is_err());
    }
}
