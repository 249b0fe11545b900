//! HetznerBareMetalMachine Custom Resource Definition.
//!
//! Describes a Hetzner Robot bare-metal server that Cluster API provisions
//! through installimage: which host to pick, what image and disk layout to
//! install, and how to reach the server over SSH before and after cloud-init.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// HetznerBareMetalMachine is the infrastructure machine for bare-metal hosts.
///
/// Example:
/// ```yaml
/// apiVersion: infrastructure.cluster.x-k8s.io/v1beta1
/// kind: HetznerBareMetalMachine
/// metadata:
///   name: bm-worker-0
/// spec:
///   installImage:
///     image:
///       path: /root/.oldroot/nfs/install/../images/Ubuntu-2204-jammy-amd64-base.tar.gz
///     partitions:
///       - mount: /
///         fileSystem: ext4
///         size: all
///   sshSpec:
///     secretRef:
///       name: robot-ssh
///       key:
///         name: sshkey-name
///         publicKey: ssh-publickey
///         privateKey: ssh-privatekey
///     portAfterInstallImage: 2222
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "HetznerBareMetalMachine",
    plural = "hetznerbaremetalmachines",
    shortname = "hbmm",
    status = "HetznerBareMetalMachineStatus",
    namespaced,
    printcolumn = r#"{"name":"ProviderID", "type":"string", "jsonPath":".spec.providerID"}"#,
    printcolumn = r#"{"name":"Ready", "type":"boolean", "jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct HetznerBareMetalMachineSpec {
    /// Provider ID of the host, set once a host has been claimed.
    #[serde(rename = "providerID", default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Image and disk layout installed on the host.
    #[serde(default)]
    pub install_image: InstallImage,

    /// Selects which bare-metal host may be claimed by this machine.
    #[serde(default)]
    pub host_selector: HostSelector,

    /// SSH access to the host.
    #[serde(default)]
    pub ssh_spec: SshSpec,
}

/// Observed state of a bare-metal machine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetznerBareMetalMachineStatus {
    /// Whether the host has been provisioned and is ready.
    #[serde(default)]
    pub ready: bool,

    /// Terminal problem reason, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// Human-readable description of the terminal problem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

/// installimage configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallImage {
    /// Operating system image to install.
    #[serde(default)]
    pub image: Image,

    /// Script executed after installimage finished.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub post_install_script: String,

    /// Partition layout.
    #[serde(default)]
    pub partitions: Vec<Partition>,

    /// Enable software RAID (0 or 1, default 0).
    #[serde(default)]
    pub swraid: i32,

    /// Software RAID level (0, 1, 5, 6 or 10, default 1).
    #[serde(default = "default_swraid_level")]
    pub swraid_level: i32,

    /// LVM logical volumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logical_volume_definitions: Vec<LogicalVolume>,

    /// Btrfs subvolumes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub btrfs_definitions: Vec<BtrfsDefinition>,
}

impl Default for InstallImage {
    fn default() -> Self {
        Self {
            image: Image::default(),
            post_install_script: String::new(),
            partitions: Vec::new(),
            swraid: 0,
            swraid_level: default_swraid_level(),
            logical_volume_definitions: Vec::new(),
            btrfs_definitions: Vec::new(),
        }
    }
}

fn default_swraid_level() -> i32 {
    1
}

/// Image source: either a downloadable archive (url + name) or a path on the
/// rescue system.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Remote archive to download.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,

    /// Name of the downloaded image.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Local path of the image on the rescue system.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

/// One installimage partition line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    /// Mount point, or `lvm` / `btrfs.<name>`.
    #[serde(default)]
    pub mount: String,

    /// File system, e.g. ext4, xfs, swap.
    #[serde(default)]
    pub file_system: String,

    /// Size such as `512M`, `20G` or `all`.
    #[serde(default)]
    pub size: String,
}

/// One installimage LV line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogicalVolume {
    /// Volume group.
    #[serde(default)]
    pub vg: String,

    /// Logical volume name.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mount: String,

    #[serde(default)]
    pub filesystem: String,

    #[serde(default)]
    pub size: String,
}

/// One installimage SUBVOL line.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BtrfsDefinition {
    #[serde(default)]
    pub volume: String,

    #[serde(default)]
    pub subvolume: String,

    #[serde(default)]
    pub mount: String,
}

/// Label selector for bare-metal hosts.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostSelector {
    /// Labels the host must carry with exactly these values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: BTreeMap<String, String>,

    /// Set-based requirements on host labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<HostSelectorRequirement>,
}

/// A single set-based label requirement.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostSelectorRequirement {
    pub key: String,

    /// Label selector operator: in, notin, exists, !, gt, lt, =, == or !=.
    pub operator: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// SSH access configuration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SshSpec {
    /// Secret holding the SSH key pair.
    #[serde(default)]
    pub secret_ref: SshSecretRef,

    /// SSH port once installimage has run (default 22).
    #[serde(default = "default_ssh_port")]
    pub port_after_install_image: i32,

    /// SSH port once cloud-init has run. Zero means "same as after installimage".
    #[serde(default)]
    pub port_after_cloud_init: i32,
}

impl Default for SshSpec {
    fn default() -> Self {
        Self {
            secret_ref: SshSecretRef::default(),
            port_after_install_image: default_ssh_port(),
            port_after_cloud_init: 0,
        }
    }
}

fn default_ssh_port() -> i32 {
    22
}

impl SshSpec {
    /// Port used after cloud-init, falling back to the installimage port while
    /// the field is still unset.
    pub fn effective_port_after_cloud_init(&self) -> i32 {
        if self.port_after_cloud_init == 0 {
            self.port_after_install_image
        } else {
            self.port_after_cloud_init
        }
    }
}

/// Reference to the Secret containing SSH keys.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SshSecretRef {
    /// Name of the Secret.
    #[serde(default)]
    pub name: String,

    /// Keys within the Secret.
    #[serde(default)]
    pub key: SshSecretKeyRef,
}

/// Keys of an SSH Secret.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SshSecretKeyRef {
    /// Key holding the name of the SSH key in Hetzner Robot.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default)]
    pub private_key: String,
}
