//! Defaulting and validation for HetznerBareMetalMachine.
//!
//! Create validates the whole spec. Update only rejects changes to
//! `installImage`, `sshSpec` and `hostSelector`, which are fixed once a host has
//! been provisioned. Every create rule checks a field inside one of those
//! subtrees, so a stored object is never re-judged by them.

use std::sync::LazyLock;

use super::{immutability, labels};
use crate::crd::{HetznerBareMetalMachine, HetznerBareMetalMachineSpec, HostSelector, InstallImage, SshSpec};
use crate::webhooks::field::{FieldPath, FieldViolation};
use crate::webhooks::outcome::ValidationResult;

/// Archive suffixes installimage can unpack
pub const IMAGE_SUFFIXES: [&str; 8] = ["tar", "tar.gz", "tar.bz", "tar.bz2", "tar.xz", "tgz", "tbz", "txz"];

/// Allowed values of `installImage.swraid`
pub const SWRAID_VALUES: [i32; 2] = [0, 1];

/// Allowed values of `installImage.swraidLevel`
pub const SWRAID_LEVELS: [i32; 5] = [0, 1, 5, 6, 10];

/// Host selector operators, spelled as in label selector strings
pub const SELECTOR_OPERATORS: [&str; 9] = ["in", "notin", "exists", "!", "gt", "lt", "=", "==", "!="];

pub const MIN_PORT: i32 = 1;
pub const MAX_PORT: i32 = 65535;

// Pattern: ^([0-9]+[MGT]|all)$
static PARTITION_SIZE_RE: LazyLock<Option<regex::Regex>> =
    LazyLock::new(|| regex::Regex::new(r"^([0-9]+[MGT]|all)$").ok());

/// Fill `sshSpec.portAfterCloudInit` from `sshSpec.portAfterInstallImage` when unset.
pub fn default(machine: &mut HetznerBareMetalMachine) {
    default_spec(&mut machine.spec);
}

fn default_spec(spec: &mut HetznerBareMetalMachineSpec) {
    if spec.ssh_spec.port_after_cloud_init == 0 {
        spec.ssh_spec.port_after_cloud_init = spec.ssh_spec.port_after_install_image;
    }
}

/// Archive suffix of an image URL, if it is one installimage understands.
pub fn image_suffix(url: &str) -> Option<&'static str> {
    // Longest match first so "x.tar.gz" is not reported as "tar"
    let mut suffixes = IMAGE_SUFFIXES;
    suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));
    suffixes
        .into_iter()
        .find(|suffix| url.strip_suffix(suffix).is_some_and(|rest| rest.ends_with('.')))
}

/// Validate a machine on CREATE
pub fn validate_create(machine: &HetznerBareMetalMachine) -> ValidationResult {
    validate_spec(&machine.spec)
}

/// Validate a machine on UPDATE
pub fn validate_update(old: &HetznerBareMetalMachine, new: &HetznerBareMetalMachine) -> ValidationResult {
    let mut result = ValidationResult::new();

    // Objects stored before defaulting existed still carry a zero post-init port
    let mut old_spec = old.spec.clone();
    default_spec(&mut old_spec);
    let mut new_spec = new.spec.clone();
    default_spec(&mut new_spec);

    let spec = FieldPath::new("spec");
    let checks = [
        immutability::check(
            spec.child("installImage"),
            "installImage",
            &old_spec.install_image,
            &new_spec.install_image,
        ),
        immutability::check(spec.child("sshSpec"), "sshSpec", &old_spec.ssh_spec, &new_spec.ssh_spec),
        immutability::check(
            spec.child("hostSelector"),
            "hostSelector",
            &old_spec.host_selector,
            &new_spec.host_selector,
        ),
    ];
    for violation in checks.into_iter().flatten() {
        result.push(violation);
    }
    result
}

/// Run every field rule over a spec
pub fn validate_spec(spec: &HetznerBareMetalMachineSpec) -> ValidationResult {
    let mut result = ValidationResult::new();
    let path = FieldPath::new("spec");
    validate_install_image(&spec.install_image, &path.child("installImage"), &mut result);
    validate_ssh(&spec.ssh_spec, &path.child("sshSpec"), &mut result);
    validate_host_selector(&spec.host_selector, &path.child("hostSelector"), &mut result);
    result
}

fn validate_install_image(image: &InstallImage, path: &FieldPath, result: &mut ValidationResult) {
    let image_path = path.child("image");
    let src = &image.image;
    if src.url.is_empty() && src.path.is_empty() {
        result.push(FieldViolation::required(
            image_path.clone(),
            "have to specify either image name and url or path",
        ));
    }
    if !src.url.is_empty() {
        if src.name.is_empty() {
            result.push(FieldViolation::required(
                image_path.child("name"),
                "name is required if url is set",
            ));
        }
        if image_suffix(&src.url).is_none() {
            result.push(FieldViolation::invalid(
                image_path.child("url"),
                &src.url,
                "unknown image type in URL",
            ));
        }
        if !src.path.is_empty() {
            result.warn(format!(
                "{}: both url and path are set, path takes precedence",
                image_path
            ));
        }
    }

    let partitions_path = path.child("partitions");
    if image.partitions.is_empty() {
        result.push(FieldViolation::required(
            partitions_path.clone(),
            "at least one partition is required",
        ));
    }
    for (i, partition) in image.partitions.iter().enumerate() {
        let p = partitions_path.index(i);
        if partition.mount.is_empty() {
            result.push(FieldViolation::required(p.child("mount"), ""));
        }
        if partition.file_system.is_empty() {
            result.push(FieldViolation::required(p.child("fileSystem"), ""));
        }
        if partition.size.is_empty() {
            result.push(FieldViolation::required(p.child("size"), ""));
        } else if !is_valid_partition_size(&partition.size) {
            result.push(FieldViolation::invalid(
                p.child("size"),
                &partition.size,
                "expected <number>M, <number>G, <number>T or all",
            ));
        }
    }

    if !SWRAID_VALUES.contains(&image.swraid) {
        result.push(FieldViolation::not_supported(
            path.child("swraid"),
            image.swraid,
            &SWRAID_VALUES.map(|v| v.to_string()),
        ));
    }
    if !SWRAID_LEVELS.contains(&image.swraid_level) {
        result.push(FieldViolation::not_supported(
            path.child("swraidLevel"),
            image.swraid_level,
            &SWRAID_LEVELS.map(|v| v.to_string()),
        ));
    }

    let lvm_path = path.child("logicalVolumeDefinitions");
    for (i, lv) in image.logical_volume_definitions.iter().enumerate() {
        let p = lvm_path.index(i);
        if lv.vg.is_empty() {
            result.push(FieldViolation::required(p.child("vg"), ""));
        }
        if lv.name.is_empty() {
            result.push(FieldViolation::required(p.child("name"), ""));
        }
        if lv.size.is_empty() {
            result.push(FieldViolation::required(p.child("size"), ""));
        }
    }

    let btrfs_path = path.child("btrfsDefinitions");
    for (i, def) in image.btrfs_definitions.iter().enumerate() {
        let p = btrfs_path.index(i);
        if def.volume.is_empty() {
            result.push(FieldViolation::required(p.child("volume"), ""));
        }
        if def.subvolume.is_empty() {
            result.push(FieldViolation::required(p.child("subvolume"), ""));
        }
    }
}

fn is_valid_partition_size(size: &str) -> bool {
    PARTITION_SIZE_RE.as_ref().is_some_and(|re| re.is_match(size))
}

fn validate_ssh(ssh: &SshSpec, path: &FieldPath, result: &mut ValidationResult) {
    let secret_path = path.child("secretRef");
    if ssh.secret_ref.name.is_empty() {
        result.push(FieldViolation::required(secret_path.child("name"), ""));
    }
    let key_path = secret_path.child("key");
    if ssh.secret_ref.key.public_key.is_empty() {
        result.push(FieldViolation::required(key_path.child("publicKey"), ""));
    }
    if ssh.secret_ref.key.private_key.is_empty() {
        result.push(FieldViolation::required(key_path.child("privateKey"), ""));
    }

    if !is_valid_port(ssh.port_after_install_image) {
        result.push(port_violation(path.child("portAfterInstallImage"), ssh.port_after_install_image));
    }
    // An unset or inherited post-init port is the install-image port, reported above
    let cloud_init = ssh.effective_port_after_cloud_init();
    if cloud_init != ssh.port_after_install_image && !is_valid_port(cloud_init) {
        result.push(port_violation(path.child("portAfterCloudInit"), cloud_init));
    }
}

fn is_valid_port(port: i32) -> bool {
    (MIN_PORT..=MAX_PORT).contains(&port)
}

fn port_violation(path: FieldPath, port: i32) -> FieldViolation {
    FieldViolation::invalid(
        path,
        port,
        format!("must be between {} and {}, inclusive", MIN_PORT, MAX_PORT),
    )
}

fn validate_host_selector(selector: &HostSelector, path: &FieldPath, result: &mut ValidationResult) {
    let labels_path = path.child("matchLabels");
    for (key, value) in &selector.match_labels {
        let errs = labels::qualified_name_errors(key);
        if !errs.is_empty() {
            result.push(FieldViolation::invalid(labels_path.clone(), key, errs.join("; ")));
        }
        let errs = labels::label_value_errors(value);
        if !errs.is_empty() {
            result.push(FieldViolation::invalid(labels_path.key(key), value, errs.join("; ")));
        }
    }

    let exprs_path = path.child("matchExpressions");
    for (i, req) in selector.match_expressions.iter().enumerate() {
        let p = exprs_path.index(i);
        let errs = labels::qualified_name_errors(&req.key);
        if !errs.is_empty() {
            result.push(FieldViolation::invalid(p.child("key"), &req.key, errs.join("; ")));
        }

        let values_path = p.child("values");
        match req.operator.as_str() {
            "in" | "notin" => {
                if req.values.is_empty() {
                    result.push(FieldViolation::required(
                        values_path,
                        format!("must be specified when operator is {}", req.operator),
                    ));
                } else {
                    for (j, value) in req.values.iter().enumerate() {
                        let errs = labels::label_value_errors(value);
                        if !errs.is_empty() {
                            result.push(FieldViolation::invalid(values_path.index(j), value, errs.join("; ")));
                        }
                    }
                }
            }
            "exists" | "!" => {
                if !req.values.is_empty() {
                    result.push(FieldViolation::forbidden(
                        values_path,
                        format!("may not be specified when operator is {}", req.operator),
                    ));
                }
            }
            "=" | "==" | "!=" => match req.values.as_slice() {
                [value] => {
                    let errs = labels::label_value_errors(value);
                    if !errs.is_empty() {
                        result.push(FieldViolation::invalid(values_path.index(0), value, errs.join("; ")));
                    }
                }
                _ => {
                    result.push(FieldViolation::invalid(
                        values_path,
                        req.values.join(","),
                        format!("must have exactly one value when operator is {}", req.operator),
                    ));
                }
            },
            "gt" | "lt" => match req.values.as_slice() {
                [value] => {
                    if value.parse::<i64>().is_err() {
                        result.push(FieldViolation::invalid(
                            values_path.index(0),
                            value,
                            format!("must be an integer when operator is {}", req.operator),
                        ));
                    }
                }
                _ => {
                    result.push(FieldViolation::invalid(
                        values_path,
                        req.values.join(","),
                        format!("must have exactly one value when operator is {}", req.operator),
                    ));
                }
            },
            other => {
                result.push(FieldViolation::not_supported(p.child("operator"), other, &SELECTOR_OPERATORS));
            }
        }
    }
}
