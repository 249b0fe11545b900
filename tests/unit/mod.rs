// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for hetzner-admission.
//!
//! These tests drive the public webhook API without an API server, one
//! admission attempt at a time.

#[path = "../common/mod.rs"]
mod common;

mod defaulting_tests {
    use crate::common::fixtures::MachineBuilder;
    use hetzner_admission::{AdmissionObject, AdmissionWebhook, Operation, ResourceKind};

    fn defaulted(obj: AdmissionObject) -> AdmissionObject {
        let mut obj = obj;
        AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine)
            .default(&mut obj)
            .unwrap();
        obj
    }

    fn cloud_init_port(obj: &AdmissionObject) -> i32 {
        match obj {
            AdmissionObject::HetznerBareMetalMachine(m) => m.spec.ssh_spec.port_after_cloud_init,
            other => panic!("unexpected kind {}", other.kind()),
        }
    }

    #[test]
    fn test_unset_port_copied_from_install_port() {
        let machine = MachineBuilder::new("bm-0").port_after_install_image(2222).build();
        assert_eq!(cloud_init_port(&defaulted(machine.into())), 2222);
    }

    #[test]
    fn test_explicit_port_kept() {
        let machine = MachineBuilder::new("bm-0")
            .port_after_install_image(2222)
            .port_after_cloud_init(22)
            .build();
        assert_eq!(cloud_init_port(&defaulted(machine.into())), 22);
    }

    #[test]
    fn test_default_is_idempotent() {
        let machine = MachineBuilder::new("bm-0").port_after_install_image(2222).build();
        let once = defaulted(machine.into());
        let twice = defaulted(once.clone());
        assert_eq!(once.to_value().unwrap(), twice.to_value().unwrap());
    }

    #[test]
    fn test_create_accepts_defaulted_machine() {
        let machine = MachineBuilder::new("bm-0").port_after_install_image(2222).build();
        let admission = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine)
            .admit(Operation::Create, Some(machine.into()), None)
            .unwrap();
        assert!(admission.outcome.is_accepted());
        assert_eq!(cloud_init_port(admission.object.as_ref().unwrap()), 2222);
    }
}

mod machine_validation_tests {
    use crate::common::fixtures::{MachineBuilder, valid_machine};
    use hetzner_admission::crd::{Image, Partition};
    use hetzner_admission::{AdmissionWebhook, Operation, ResourceKind};

    fn webhook() -> AdmissionWebhook {
        AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine)
    }

    fn violation_paths(machine: hetzner_admission::crd::HetznerBareMetalMachine) -> Vec<String> {
        let admission = webhook()
            .admit(Operation::Create, Some(machine.into()), None)
            .unwrap();
        admission
            .outcome
            .violations()
            .iter()
            .map(|v| v.path.to_string())
            .collect()
    }

    #[test]
    fn test_valid_machine_accepted() {
        assert!(violation_paths(valid_machine("bm-0")).is_empty());
    }

    #[test]
    fn test_url_image_accepted() {
        let machine = MachineBuilder::new("bm-0")
            .image_url("https://images.example.com/ubuntu-24.04.tar.bz2", "ubuntu-24.04")
            .build();
        assert!(violation_paths(machine).is_empty());
    }

    #[test]
    fn test_unknown_image_type() {
        let machine = MachineBuilder::new("bm-0")
            .image_url("https://images.example.com/ubuntu.iso", "ubuntu")
            .build();
        assert_eq!(violation_paths(machine), ["spec.installImage.image.url"]);
    }

    #[test]
    fn test_every_violation_reported() {
        let machine = MachineBuilder::new("bm-0")
            .image(Image::default())
            .partitions(vec![Partition {
                mount: "/".to_string(),
                file_system: "ext4".to_string(),
                size: "100X".to_string(),
            }])
            .swraid(3, 1)
            .secret_name("")
            .port_after_install_image(0)
            .match_expression("cores", "gt", &["many"])
            .build();

        assert_eq!(
            violation_paths(machine),
            [
                "spec.installImage.image",
                "spec.installImage.partitions[0].size",
                "spec.installImage.swraid",
                "spec.sshSpec.secretRef.name",
                "spec.sshSpec.portAfterInstallImage",
                "spec.hostSelector.matchExpressions[0].values[0]",
            ]
        );
    }

    #[test]
    fn test_rejection_message_lists_violations() {
        let machine = MachineBuilder::new("bm-0")
            .secret_name("")
            .port_after_install_image(70000)
            .build();
        let admission = webhook()
            .admit(Operation::Create, Some(machine.into()), None)
            .unwrap();
        let rejection = admission.outcome.rejection().unwrap();
        assert_eq!(
            rejection.to_string(),
            concat!(
                r#"HetznerBareMetalMachine.infrastructure.cluster.x-k8s.io "bm-0" is invalid: ["#,
                r#"spec.sshSpec.secretRef.name: Required value, "#,
                r#"spec.sshSpec.portAfterInstallImage: Invalid value: "70000": must be between 1 and 65535, inclusive]"#
            )
        );
    }

    #[test]
    fn test_selector_operator_spellings() {
        let machine = MachineBuilder::new("bm-0")
            .match_expression("topology.kubernetes.io/region", "in", &["fsn1"])
            .match_expression("disk", "exists", &[])
            .match_expression("gpu", "!", &[])
            .match_expression("cpu", "==", &["amd"])
            .match_expression("cores", "lt", &["64"])
            .build();
        assert!(violation_paths(machine).is_empty());

        let machine = MachineBuilder::new("bm-0")
            .match_expression("zone", "In", &["fsn1"])
            .build();
        assert_eq!(
            violation_paths(machine),
            ["spec.hostSelector.matchExpressions[0].operator"]
        );
    }

    #[test]
    fn test_rejection_status() {
        let machine = MachineBuilder::new("bm-0").swraid(0, 4).build();
        let admission = webhook()
            .admit(Operation::Create, Some(machine.into()), None)
            .unwrap();
        let status = admission.outcome.rejection().unwrap().to_status();
        assert_eq!(status.code, 422);
        assert_eq!(status.reason, "Invalid");

        let details = status.details.unwrap();
        assert_eq!(details.kind, "HetznerBareMetalMachine");
        assert_eq!(details.group, "infrastructure.cluster.x-k8s.io");
        assert_eq!(details.name, "bm-0");
        assert_eq!(details.causes.len(), 1);
        assert_eq!(details.causes[0].reason, "FieldValueNotSupported");
        assert_eq!(details.causes[0].field, "spec.installImage.swraidLevel");
    }

    #[test]
    fn test_url_and_path_warning() {
        let mut machine = MachineBuilder::new("bm-0")
            .image_url("https://images.example.com/ubuntu.tar.gz", "ubuntu")
            .build();
        machine.spec.install_image.image.path = "/root/images/ubuntu.tar.gz".to_string();
        let admission = webhook()
            .admit(Operation::Create, Some(machine.into()), None)
            .unwrap();
        assert!(admission.outcome.is_accepted());
        assert_eq!(admission.outcome.warnings().len(), 1);
    }
}

mod update_tests {
    use crate::common::fixtures::{MachineBuilder, cluster_template};
    use hetzner_admission::{AdmissionObject, AdmissionWebhook, Operation, ResourceKind};

    #[test]
    fn test_template_spec_immutable() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerClusterTemplate);
        let old: AdmissionObject = cluster_template("quickstart", &["fsn1"]).into();
        let new: AdmissionObject = cluster_template("quickstart", &["fsn1", "nbg1"]).into();

        let admission = hook.admit(Operation::Update, Some(new), Some(old)).unwrap();
        let violations = admission.outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.as_str(), "spec");
        assert_eq!(violations[0].detail, "spec is immutable");
    }

    #[test]
    fn test_template_metadata_change_allowed() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerClusterTemplate);
        let old = cluster_template("quickstart", &["fsn1"]);
        let mut new = old.clone();
        new.metadata.labels = Some([("team".to_string(), "infra".to_string())].into());

        let outcome = hook.validate_update(&old.into(), &new.into()).unwrap();
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_machine_install_image_immutable() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine);
        let old = MachineBuilder::new("bm-0").build();
        let new = MachineBuilder::new("bm-0")
            .image_url("https://images.example.com/debian.tar.gz", "debian")
            .build();

        let admission = hook
            .admit(Operation::Update, Some(new.into()), Some(old.into()))
            .unwrap();
        let violations = admission.outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].detail, "installImage is immutable");
    }

    #[test]
    fn test_machine_host_selector_immutable() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine);
        let old = MachineBuilder::new("bm-0").build();
        let new = MachineBuilder::new("bm-0").match_label("zone", "hel1").build();

        let admission = hook
            .admit(Operation::Update, Some(new.into()), Some(old.into()))
            .unwrap();
        let violations = admission.outcome.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path.as_str(), "spec.hostSelector");
    }

    #[test]
    fn test_machine_provider_id_mutable() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine);
        let old = MachineBuilder::new("bm-0").build();
        let mut new = old.clone();
        new.spec.provider_id = Some("hrobot://1234".to_string());

        let admission = hook
            .admit(Operation::Update, Some(new.into()), Some(old.into()))
            .unwrap();
        assert!(admission.outcome.is_accepted());
    }

    #[test]
    fn test_finalizer_removal_on_invalid_stored_machine() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine);
        let mut old = MachineBuilder::new("bm-0").partitions(vec![]).build();
        old.metadata.finalizers = Some(vec![
            "hetznerbaremetalmachine.infrastructure.cluster.x-k8s.io".to_string(),
        ]);
        let mut new = old.clone();
        new.metadata.finalizers = None;

        let admission = hook
            .admit(Operation::Update, Some(new.into()), Some(old.into()))
            .unwrap();
        assert!(admission.outcome.is_accepted(), "{:?}", admission.outcome.violations());
    }
}

mod delete_tests {
    use crate::common::fixtures::{MachineBuilder, cluster_template};
    use hetzner_admission::crd::{HCloudRemediation, HCloudRemediationSpec};
    use hetzner_admission::{AdmissionObject, AdmissionWebhook, Operation, ResourceKind};

    #[test]
    fn test_delete_accepts_invalid_machine() {
        // Deletion must stay possible for objects that no longer validate
        let machine = MachineBuilder::new("bm-0")
            .secret_name("")
            .port_after_install_image(-1)
            .build();
        let admission = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine)
            .admit(Operation::Delete, None, Some(machine.into()))
            .unwrap();
        assert!(admission.outcome.is_accepted());
        assert!(admission.object.is_none());
    }

    #[test]
    fn test_delete_template_and_remediation() {
        let template: AdmissionObject = cluster_template("quickstart", &["fsn1"]).into();
        let outcome = AdmissionWebhook::new(ResourceKind::HetznerClusterTemplate)
            .validate_delete(&template)
            .unwrap();
        assert!(outcome.is_accepted());

        let remediation: AdmissionObject =
            HCloudRemediation::new("r", HCloudRemediationSpec::default()).into();
        let outcome = AdmissionWebhook::new(ResourceKind::HCloudRemediation)
            .validate_delete(&remediation)
            .unwrap();
        assert!(outcome.is_accepted());
    }
}

mod bad_request_tests {
    use crate::common::fixtures::{cluster_template, valid_machine};
    use hetzner_admission::{AdmissionObject, AdmissionWebhook, Operation, ResourceKind};

    #[test]
    fn test_wrong_kind() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine);
        let template: AdmissionObject = cluster_template("quickstart", &["fsn1"]).into();
        let err = hook.admit(Operation::Create, Some(template), None).unwrap_err();
        assert!(err.is_bad_request());
        assert_eq!(
            err.to_string(),
            "bad request: expected a HetznerBareMetalMachine but got a HetznerClusterTemplate"
        );
    }

    #[test]
    fn test_mixed_kinds_on_update() {
        let hook = AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine);
        let old: AdmissionObject = cluster_template("quickstart", &["fsn1"]).into();
        let new: AdmissionObject = valid_machine("bm-0").into();
        let err = hook.admit(Operation::Update, Some(new), Some(old)).unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_one_webhook_per_kind() {
        let kinds: Vec<ResourceKind> = AdmissionWebhook::all().iter().map(|h| h.kind()).collect();
        assert_eq!(kinds, ResourceKind::ALL);
    }
}

mod manifest_tests {
    use hetzner_admission::manifest;
    use hetzner_admission::{AdmissionWebhook, Operation, ResourceKind};

    const TEMPLATE_YAML: &str = r#"
apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
kind: HetznerClusterTemplate
metadata:
  name: quickstart
  namespace: default
spec:
  template:
    spec:
      controlPlaneRegions:
        - fsn1
      hcloudNetwork:
        enabled: true
      controlPlaneLoadBalancer:
        region: fsn1
"#;

    #[test]
    fn test_parsed_manifest_is_admitted() {
        let obj = manifest::parse_object(TEMPLATE_YAML).unwrap();
        assert_eq!(obj.kind(), ResourceKind::HetznerClusterTemplate);

        let admission = AdmissionWebhook::new(obj.kind())
            .admit(Operation::Create, Some(obj), None)
            .unwrap();
        assert!(admission.outcome.is_accepted());
    }

    #[test]
    fn test_missing_kind_is_bad_request() {
        let err = manifest::parse_object(
            "apiVersion: infrastructure.cluster.x-k8s.io/v1beta1\nmetadata:\n  name: x\n",
        )
        .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_missing_file() {
        let err = manifest::read_object(std::path::Path::new("/nonexistent/machine.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/machine.yaml"));
    }
}
