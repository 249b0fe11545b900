//! Validation for remediation kinds.
//!
//! HCloudRemediation, HetznerBareMetalRemediation and
//! HetznerBareMetalRemediationTemplate carry no admission rules yet; every
//! create and update is accepted.

use crate::webhooks::outcome::ValidationResult;

/// Validate any remediation kind on CREATE
pub fn validate_create<K>(_remediation: &K) -> ValidationResult {
    ValidationResult::new()
}

/// Validate any remediation kind on UPDATE
pub fn validate_update<K>(_old: &K, _new: &K) -> ValidationResult {
    ValidationResult::new()
}
