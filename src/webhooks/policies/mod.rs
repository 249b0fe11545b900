//! Defaulting and validation policies, one module per kind.
//!
//! Policies are organized by lifecycle stage:
//! - Defaulting: CREATE and UPDATE, before any validation
//! - Field rules: only on CREATE
//! - Immutability: only on UPDATE operations
//!
//! Rules never stop at the first problem; every violation found in a pass is
//! returned, in the order the rules are written.

pub mod bare_metal_machine;
pub mod cluster_template;
pub mod immutability;
pub mod labels;
pub mod remediation;

use super::object::AdmissionObject;
use super::outcome::ValidationResult;

/// Apply the kind's defaulting rules in place.
pub fn default(obj: &mut AdmissionObject) {
    match obj {
        AdmissionObject::HetznerBareMetalMachine(machine) => bare_metal_machine::default(machine),
        AdmissionObject::HetznerClusterTemplate(_)
        | AdmissionObject::HCloudRemediation(_)
        | AdmissionObject::HetznerBareMetalRemediation(_)
        | AdmissionObject::HetznerBareMetalRemediationTemplate(_) => {}
    }
}

/// Run the kind's CREATE rules
pub fn validate_create(obj: &AdmissionObject) -> ValidationResult {
    match obj {
        AdmissionObject::HetznerBareMetalMachine(machine) => {
            bare_metal_machine::validate_create(machine)
        }
        AdmissionObject::HetznerClusterTemplate(template) => {
            cluster_template::validate_create(template)
        }
        AdmissionObject::HCloudRemediation(r) => remediation::validate_create(r),
        AdmissionObject::HetznerBareMetalRemediation(r) => remediation::validate_create(r),
        AdmissionObject::HetznerBareMetalRemediationTemplate(r) => remediation::validate_create(r),
    }
}

/// Run the kind's UPDATE rules. Returns `None` when old and new are of
/// different kinds.
pub fn validate_update(old: &AdmissionObject, new: &AdmissionObject) -> Option<ValidationResult> {
    let result = match (old, new) {
        (
            AdmissionObject::HetznerBareMetalMachine(old),
            AdmissionObject::HetznerBareMetalMachine(new),
        ) => bare_metal_machine::validate_update(old, new),
        (
            AdmissionObject::HetznerClusterTemplate(old),
            AdmissionObject::HetznerClusterTemplate(new),
        ) => cluster_template::validate_update(old, new),
        (AdmissionObject::HCloudRemediation(old), AdmissionObject::HCloudRemediation(new)) => {
            remediation::validate_update(old, new)
        }
        (
            AdmissionObject::HetznerBareMetalRemediation(old),
            AdmissionObject::HetznerBareMetalRemediation(new),
        ) => remediation::validate_update(old, new),
        (
            AdmissionObject::HetznerBareMetalRemediationTemplate(old),
            AdmissionObject::HetznerBareMetalRemediationTemplate(new),
        ) => remediation::validate_update(old, new),
        _ => return None,
    };
    Some(result)
}

/// Run the kind's DELETE rules. No observed kind restricts deletion.
pub fn validate_delete(_obj: &AdmissionObject) -> ValidationResult {
    ValidationResult::new()
}
