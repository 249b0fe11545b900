//! Admission webhooks for Hetzner infrastructure resources.
//!
//! An [`AdmissionWebhook`] is bound to one resource kind and exposes the four
//! entry points an admission gateway calls: defaulting on CREATE/UPDATE, then
//! validation on CREATE, UPDATE or DELETE. Handing it an object of another
//! kind is a bad request, never a field violation.
//!
//! Validation follows the API server's conventions:
//! - every violation found is reported, not just the first
//! - immutability is only checked on UPDATE
//! - a rejection renders like an `Invalid` status error

pub mod field;
pub mod object;
pub mod outcome;
pub mod policies;

pub use field::{FieldPath, FieldViolation, ViolationReason};
pub use object::{AdmissionObject, ResourceKind};
pub use outcome::{AdmissionOutcome, Rejection, ResourceIdentity, ValidationResult};

// Re-export the kube-rs operation type used by `AdmissionWebhook::admit`
pub use kube::core::admission::Operation;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Result of running one full admission attempt.
#[derive(Clone, Debug)]
pub struct Admission {
    /// The defaulted candidate (`None` for DELETE)
    pub object: Option<AdmissionObject>,
    pub outcome: AdmissionOutcome,
}

/// Defaulting and validation entry points for one resource kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdmissionWebhook {
    kind: ResourceKind,
}

impl AdmissionWebhook {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }

    /// One webhook per admitted kind
    pub fn all() -> Vec<Self> {
        ResourceKind::ALL.into_iter().map(Self::new).collect()
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    fn expect_kind(&self, obj: &AdmissionObject) -> Result<()> {
        if obj.kind() == self.kind {
            Ok(())
        } else {
            Err(Error::bad_request(format!(
                "expected a {} but got a {}",
                self.kind,
                obj.kind()
            )))
        }
    }

    /// Fill derived defaults into the candidate. Invoked on CREATE and UPDATE.
    pub fn default(&self, candidate: &mut AdmissionObject) -> Result<()> {
        self.expect_kind(candidate)?;
        debug!(kind = %self.kind, name = %candidate.name(), "default");
        policies::default(candidate);
        Ok(())
    }

    /// Validate a defaulted candidate on CREATE
    pub fn validate_create(&self, candidate: &AdmissionObject) -> Result<AdmissionOutcome> {
        self.expect_kind(candidate)?;
        debug!(kind = %self.kind, name = %candidate.name(), "validate create");
        let result = policies::validate_create(candidate);
        Ok(AdmissionOutcome::aggregate(candidate.identity(), result))
    }

    /// Validate a defaulted candidate against its prior version on UPDATE
    pub fn validate_update(
        &self,
        old: &AdmissionObject,
        candidate: &AdmissionObject,
    ) -> Result<AdmissionOutcome> {
        self.expect_kind(old)?;
        self.expect_kind(candidate)?;
        debug!(kind = %self.kind, name = %candidate.name(), "validate update");
        let result = policies::validate_update(old, candidate).ok_or_else(|| {
            Error::bad_request(format!(
                "expected a {} but got a {}",
                old.kind(),
                candidate.kind()
            ))
        })?;
        Ok(AdmissionOutcome::aggregate(candidate.identity(), result))
    }

    /// Validate a DELETE of an existing object
    pub fn validate_delete(&self, existing: &AdmissionObject) -> Result<AdmissionOutcome> {
        self.expect_kind(existing)?;
        debug!(kind = %self.kind, name = %existing.name(), "validate delete");
        let result = policies::validate_delete(existing);
        Ok(AdmissionOutcome::aggregate(existing.identity(), result))
    }

    /// Run a whole admission attempt: default the candidate (CREATE/UPDATE),
    /// then validate it.
    ///
    /// `candidate` is the incoming object, `old` the stored one; DELETE only
    /// carries `old`.
    pub fn admit(
        &self,
        operation: Operation,
        candidate: Option<AdmissionObject>,
        old: Option<AdmissionObject>,
    ) -> Result<Admission> {
        let (object, outcome) = match operation {
            Operation::Create => {
                let mut candidate = candidate.ok_or_else(|| Error::bad_request("missing object in request"))?;
                self.default(&mut candidate)?;
                let outcome = self.validate_create(&candidate)?;
                (Some(candidate), outcome)
            }
            Operation::Update => {
                let mut candidate = candidate.ok_or_else(|| Error::bad_request("missing object in request"))?;
                let old = old.ok_or_else(|| Error::bad_request("missing old object in UPDATE request"))?;
                self.default(&mut candidate)?;
                let outcome = self.validate_update(&old, &candidate)?;
                (Some(candidate), outcome)
            }
            Operation::Delete => {
                let existing = old.ok_or_else(|| Error::bad_request("missing old object in DELETE request"))?;
                (None, self.validate_delete(&existing)?)
            }
            Operation::Connect => {
                return Err(Error::bad_request(format!(
                    "operation {:?} is not supported for {}",
                    operation, self.kind
                )));
            }
        };

        match &outcome {
            AdmissionOutcome::Accepted { warnings } => {
                info!(
                    kind = %self.kind,
                    operation = ?operation,
                    warnings = warnings.len(),
                    "Admission request allowed"
                );
            }
            AdmissionOutcome::Rejected(rejection) => {
                warn!(
                    kind = %self.kind,
                    operation = ?operation,
                    violations = rejection.violations().len(),
                    message = %rejection,
                    "Admission request denied"
                );
            }
        }

        Ok(Admission { object, outcome })
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::crd::{
        HCloudRemediation, HCloudRemediationSpec, HetznerBareMetalMachine,
        HetznerBareMetalMachineSpec, HetznerClusterTemplate, HetznerClusterTemplateSpec, Image,
        Partition,
    };

    fn machine(port_after_cloud_init: i32) -> AdmissionObject {
        let mut spec = HetznerBareMetalMachineSpec::default();
        spec.install_image.image = Image {
            path: "/root/images/Ubuntu-2404-noble-amd64-base.tar.gz".to_string(),
            ..Default::default()
        };
        spec.install_image.partitions = vec![Partition {
            mount: "/".to_string(),
            file_system: "ext4".to_string(),
            size: "all".to_string(),
        }];
        spec.ssh_spec.secret_ref.name = "robot-ssh".to_string();
        spec.ssh_spec.secret_ref.key.public_key = "ssh-publickey".to_string();
        spec.ssh_spec.secret_ref.key.private_key = "ssh-privatekey".to_string();
        spec.ssh_spec.port_after_install_image = 2222;
        spec.ssh_spec.port_after_cloud_init = port_after_cloud_init;
        HetznerBareMetalMachine::new("bm-0", spec).into()
    }

    fn template(region: &str) -> AdmissionObject {
        let mut spec = HetznerClusterTemplateSpec::default();
        spec.template.spec.control_plane_regions = vec![region.to_string()];
        HetznerClusterTemplate::new("quickstart", spec).into()
    }

    fn webhook(kind: ResourceKind) -> AdmissionWebhook {
        AdmissionWebhook::new(kind)
    }

    #[test]
    fn test_wrong_kind_is_bad_request() {
        let hook = webhook(ResourceKind::HetznerClusterTemplate);
        let remediation: AdmissionObject =
            HCloudRemediation::new("r", HCloudRemediationSpec::default()).into();

        let err = hook.validate_create(&remediation).unwrap_err();
        assert!(err.is_bad_request());
        assert!(
            err.to_string()
                .contains("expected a HetznerClusterTemplate but got a HCloudRemediation")
        );

        let mut remediation = remediation;
        assert!(hook.default(&mut remediation).is_err());
        assert!(hook.validate_delete(&remediation).is_err());
        assert!(hook.validate_update(&template("fsn1"), &remediation).is_err());
    }

    #[test]
    fn test_create_defaults_then_accepts() {
        let hook = webhook(ResourceKind::HetznerBareMetalMachine);
        let admission = hook.admit(Operation::Create, Some(machine(0)), None).unwrap();
        assert!(admission.outcome.is_accepted());
        match admission.object.unwrap() {
            AdmissionObject::HetznerBareMetalMachine(m) => {
                assert_eq!(m.spec.ssh_spec.port_after_cloud_init, 2222);
            }
            other => panic!("unexpected kind {:?}", other.kind()),
        }
    }

    #[test]
    fn test_template_update_rejected() {
        let hook = webhook(ResourceKind::HetznerClusterTemplate);
        let outcome = hook.validate_update(&template("fsn1"), &template("nbg1")).unwrap();
        let rejection = outcome.rejection().unwrap();
        assert_eq!(rejection.violations().len(), 1);
        assert_eq!(rejection.violations()[0].detail, "spec is immutable");
        assert_eq!(rejection.identity().name, "quickstart");
    }

    #[test]
    fn test_template_update_unchanged_accepted() {
        let hook = webhook(ResourceKind::HetznerClusterTemplate);
        let admission = hook
            .admit(Operation::Update, Some(template("fsn1")), Some(template("fsn1")))
            .unwrap();
        assert!(admission.outcome.is_accepted());
    }

    #[test]
    fn test_delete_always_accepted() {
        for hook in AdmissionWebhook::all() {
            let existing = match hook.kind() {
                ResourceKind::HetznerBareMetalMachine => machine(0),
                ResourceKind::HetznerClusterTemplate => template("fsn1"),
                ResourceKind::HCloudRemediation => {
                    HCloudRemediation::new("r", HCloudRemediationSpec::default()).into()
                }
                ResourceKind::HetznerBareMetalRemediation => {
                    crate::crd::HetznerBareMetalRemediation::new("r", Default::default()).into()
                }
                ResourceKind::HetznerBareMetalRemediationTemplate => {
                    crate::crd::HetznerBareMetalRemediationTemplate::new("r", Default::default())
                        .into()
                }
            };
            let admission = hook.admit(Operation::Delete, None, Some(existing)).unwrap();
            assert!(admission.object.is_none());
            assert!(admission.outcome.is_accepted());
            assert!(admission.outcome.violations().is_empty());
        }
    }

    #[test]
    fn test_missing_objects_are_bad_requests() {
        let hook = webhook(ResourceKind::HetznerBareMetalMachine);
        assert!(hook.admit(Operation::Create, None, None).unwrap_err().is_bad_request());
        assert!(
            hook.admit(Operation::Update, Some(machine(0)), None)
                .unwrap_err()
                .is_bad_request()
        );
        assert!(hook.admit(Operation::Delete, None, None).unwrap_err().is_bad_request());
        assert!(
            hook.admit(Operation::Connect, Some(machine(0)), None)
                .unwrap_err()
                .is_bad_request()
        );
    }

    #[test]
    fn test_machine_update_after_default() {
        let hook = webhook(ResourceKind::HetznerBareMetalMachine);
        let admission = hook
            .admit(Operation::Update, Some(machine(0)), Some(machine(0)))
            .unwrap();
        assert!(admission.outcome.is_accepted());

        let admission = hook
            .admit(Operation::Update, Some(machine(22)), Some(machine(0)))
            .unwrap();
        let violations = admission.outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.as_str(), "spec.sshSpec");
    }
}
