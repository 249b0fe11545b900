// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::string_slice
)]

//! Property-based tests for hetzner-admission.
//!
//! Uses proptest to generate random inputs and verify invariants.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;

use common::fixtures::{MachineBuilder, cluster_template};
use hetzner_admission::crd::HetznerBareMetalMachine;
use hetzner_admission::{AdmissionObject, AdmissionWebhook, Operation, ResourceKind};

/// Strategy for generating valid TCP ports.
fn valid_port() -> impl Strategy<Value = i32> {
    1..=65535i32
}

/// Strategy for generating ports outside 1..=65535.
fn invalid_port() -> impl Strategy<Value = i32> {
    prop_oneof![i32::MIN..=0i32, 65536..=i32::MAX]
}

/// Strategy for generating control plane region lists.
fn regions() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("fsn1".to_string()),
            Just("nbg1".to_string()),
            Just("hel1".to_string()),
            Just("ash".to_string()),
        ],
        0..4,
    )
}

fn machine_webhook() -> AdmissionWebhook {
    AdmissionWebhook::new(ResourceKind::HetznerBareMetalMachine)
}

fn defaulted(machine: HetznerBareMetalMachine) -> HetznerBareMetalMachine {
    let mut obj = AdmissionObject::from(machine);
    machine_webhook().default(&mut obj).unwrap();
    match obj {
        AdmissionObject::HetznerBareMetalMachine(m) => m,
        other => panic!("unexpected kind {}", other.kind()),
    }
}

proptest! {
    /// Property: An unset post-init port always takes the install-image port.
    #[test]
    fn test_default_copies_install_port(port in any::<i32>()) {
        let machine = MachineBuilder::new("bm-0").port_after_install_image(port).build();
        let machine = defaulted(machine);
        prop_assert_eq!(machine.spec.ssh_spec.port_after_cloud_init, port);
    }

    /// Property: A set post-init port is never overwritten.
    #[test]
    fn test_default_keeps_set_port(install in any::<i32>(), cloud_init in any::<i32>()) {
        prop_assume!(cloud_init != 0);
        let machine = MachineBuilder::new("bm-0")
            .port_after_install_image(install)
            .port_after_cloud_init(cloud_init)
            .build();
        let machine = defaulted(machine);
        prop_assert_eq!(machine.spec.ssh_spec.port_after_cloud_init, cloud_init);
    }

    /// Property: Defaulting twice equals defaulting once.
    #[test]
    fn test_default_idempotent(install in any::<i32>(), cloud_init in any::<i32>()) {
        let machine = MachineBuilder::new("bm-0")
            .port_after_install_image(install)
            .port_after_cloud_init(cloud_init)
            .build();
        let once = defaulted(machine);
        let twice = defaulted(once.clone());
        prop_assert_eq!(once.spec, twice.spec);
    }

    /// Property: A machine accepted on create stays accepted when updated to itself.
    #[test]
    fn test_unchanged_update_accepted(install in valid_port(), cloud_init in valid_port()) {
        let machine = MachineBuilder::new("bm-0")
            .port_after_install_image(install)
            .port_after_cloud_init(cloud_init)
            .build();
        let admission = machine_webhook()
            .admit(Operation::Update, Some(machine.clone().into()), Some(machine.into()))
            .unwrap();
        prop_assert!(admission.outcome.is_accepted());
    }

    /// Property: Changing only the SSH ports yields exactly one immutability violation.
    #[test]
    fn test_changed_ssh_spec_single_violation(
        old_port in valid_port(),
        new_port in valid_port()
    ) {
        prop_assume!(old_port != new_port);
        let old = MachineBuilder::new("bm-0").port_after_install_image(old_port).build();
        let new = MachineBuilder::new("bm-0").port_after_install_image(new_port).build();
        let admission = machine_webhook()
            .admit(Operation::Update, Some(new.into()), Some(old.into()))
            .unwrap();
        let violations = admission.outcome.violations();
        prop_assert_eq!(violations.len(), 1);
        prop_assert_eq!(violations[0].path.as_str(), "spec.sshSpec");
    }

    /// Property: K independent bad ports produce K violations on create.
    #[test]
    fn test_violations_counted(
        install in invalid_port(),
        cloud_init in prop::option::of(invalid_port())
    ) {
        let mut builder = MachineBuilder::new("bm-0").port_after_install_image(install);
        let mut expected = 1;
        if let Some(port) = cloud_init {
            // Zero or the install port means inherited, already reported once
            prop_assume!(port != 0 && port != install);
            builder = builder.port_after_cloud_init(port);
            expected += 1;
        }
        let admission = machine_webhook()
            .admit(Operation::Create, Some(builder.build().into()), None)
            .unwrap();
        prop_assert_eq!(admission.outcome.violations().len(), expected);
        prop_assert!(!admission.outcome.is_accepted());
    }

    /// Property: K changed immutable subtrees produce K violations on update,
    /// whether or not the stored object passes the create rules.
    #[test]
    fn test_update_violations_counted(
        change_image in any::<bool>(),
        change_ssh in any::<bool>(),
        change_selector in any::<bool>(),
        stored_invalid in any::<bool>()
    ) {
        let mut builder = MachineBuilder::new("bm-0");
        if stored_invalid {
            builder = builder.partitions(vec![]).secret_name("");
        }
        let old = builder.clone().build();

        if change_ssh {
            builder = builder.port_after_install_image(2222);
        }
        if change_selector {
            builder = builder.match_label("zone", "hel1");
        }
        let mut new = builder.build();
        if change_image {
            new.spec.install_image.post_install_script = "apt-get update".to_string();
        }

        let admission = machine_webhook()
            .admit(Operation::Update, Some(new.into()), Some(old.into()))
            .unwrap();
        let expected = [change_image, change_ssh, change_selector]
            .into_iter()
            .filter(|changed| *changed)
            .count();
        prop_assert_eq!(admission.outcome.violations().len(), expected);
        prop_assert_eq!(admission.outcome.is_accepted(), expected == 0);
    }

    /// Property: Accepted exactly when there are no violations.
    #[test]
    fn test_accepted_iff_no_violations(
        install in any::<i32>(),
        swraid in -1..3i32,
        level in -1..11i32
    ) {
        let machine = MachineBuilder::new("bm-0")
            .port_after_install_image(install)
            .swraid(swraid, level)
            .build();
        let admission = machine_webhook()
            .admit(Operation::Create, Some(machine.into()), None)
            .unwrap();
        prop_assert_eq!(
            admission.outcome.is_accepted(),
            admission.outcome.violations().is_empty()
        );
    }

    /// Property: Any template spec change is a single violation, no change is none.
    #[test]
    fn test_template_immutability(old in regions(), new in regions()) {
        let old_refs: Vec<&str> = old.iter().map(String::as_str).collect();
        let new_refs: Vec<&str> = new.iter().map(String::as_str).collect();
        let hook = AdmissionWebhook::new(ResourceKind::HetznerClusterTemplate);
        let outcome = hook
            .validate_update(
                &cluster_template("t", &old_refs).into(),
                &cluster_template("t", &new_refs).into(),
            )
            .unwrap();
        let expected = usize::from(old != new);
        prop_assert_eq!(outcome.violations().len(), expected);
    }

    /// Property: Delete is accepted whatever the stored object looks like.
    #[test]
    fn test_delete_always_accepted(install in any::<i32>(), secret in "[a-z]{0,8}") {
        let machine = MachineBuilder::new("bm-0")
            .port_after_install_image(install)
            .secret_name(secret)
            .build();
        let admission = machine_webhook()
            .admit(Operation::Delete, None, Some(machine.into()))
            .unwrap();
        prop_assert!(admission.outcome.is_accepted());
    }
}
