//! HetznerClusterTemplate Custom Resource Definition.
//!
//! A template from which ClusterClass-based clusters stamp out their
//! HetznerCluster. The embedded cluster spec is immutable once created.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// HetznerClusterTemplate holds a HetznerCluster spec used as a template.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "HetznerClusterTemplate",
    plural = "hetznerclustertemplates",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HetznerClusterTemplateSpec {
    pub template: HetznerClusterTemplateResource,
}

/// Wrapper mirroring the `template.spec` nesting used by Cluster API templates.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetznerClusterTemplateResource {
    pub spec: HetznerClusterSpec,
}

/// Desired state of a Hetzner cluster.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetznerClusterSpec {
    /// Private network for the cluster.
    #[serde(default)]
    pub hcloud_network: HCloudNetworkSpec,

    /// Regions the control plane is spread over, e.g. fsn1, nbg1, hel1.
    #[serde(default)]
    pub control_plane_regions: Vec<String>,

    /// SSH keys injected into servers.
    #[serde(default)]
    pub ssh_keys: HetznerSshKeys,

    /// Endpoint of the API server, filled once the load balancer exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_endpoint: Option<ApiEndpoint>,

    /// Load balancer in front of the control plane.
    #[serde(default)]
    pub control_plane_load_balancer: LoadBalancerSpec,

    /// Placement groups machines can be scheduled into.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hcloud_placement_groups: Vec<HCloudPlacementGroupSpec>,

    /// Secret with the HCloud token and Robot credentials.
    #[serde(default)]
    pub hetzner_secret_ref: HetznerSecretRef,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HCloudNetworkSpec {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cidr_block: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet_cidr_block: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_zone: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetznerSshKeys {
    /// HCloud SSH keys by name or fingerprint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hcloud: Vec<SshKey>,

    /// Secret containing the Robot SSH key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robot_ref: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiEndpoint {
    pub host: String,
    pub port: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerSpec {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// round_robin or least_connections.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub algorithm: String,

    /// Load balancer type, e.g. lb11.
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub lb_type: String,

    #[serde(default)]
    pub port: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_services: Vec<LoadBalancerService>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoadBalancerService {
    #[serde(default)]
    pub protocol: String,

    #[serde(default)]
    pub listen_port: i32,

    #[serde(default)]
    pub destination_port: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HCloudPlacementGroupSpec {
    pub name: String,

    #[serde(default, rename = "type")]
    pub group_type: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetznerSecretRef {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub key: HetznerSecretKeyRef,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HetznerSecretKeyRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hcloud_token: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hetzner_robot_user: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hetzner_robot_password: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,
}
