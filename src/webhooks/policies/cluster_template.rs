//! Validation for HetznerClusterTemplate.
//!
//! Templates are consumed by ClusterClass topologies, which assume the
//! template never changes underneath them: the whole spec is immutable.

use super::immutability;
use crate::crd::HetznerClusterTemplate;
use crate::webhooks::field::FieldPath;
use crate::webhooks::outcome::ValidationResult;

/// Validate a template on CREATE. Any well-formed template is accepted.
pub fn validate_create(_template: &HetznerClusterTemplate) -> ValidationResult {
    ValidationResult::new()
}

/// Validate a template on UPDATE
pub fn validate_update(old: &HetznerClusterTemplate, new: &HetznerClusterTemplate) -> ValidationResult {
    let mut result = ValidationResult::new();
    if let Some(violation) = immutability::check(FieldPath::new("spec"), "spec", &old.spec, &new.spec) {
        result.push(violation);
    }
    result
}
