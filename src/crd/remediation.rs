//! Remediation Custom Resource Definitions.
//!
//! - `HCloudRemediation`: remediation request for an HCloud machine
//! - `HetznerBareMetalRemediation`: remediation request for a bare-metal machine
//! - `HetznerBareMetalRemediationTemplate`: template for bare-metal remediations
//!
//! All three share [`RemediationSpec`]. Admission currently accepts them as-is.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Remediation request for an unhealthy HCloud machine.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "HCloudRemediation",
    plural = "hcloudremediations",
    status = "RemediationStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HCloudRemediationSpec {
    #[serde(flatten)]
    pub remediation: RemediationSpec,
}

/// Remediation request for an unhealthy bare-metal machine.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "HetznerBareMetalRemediation",
    plural = "hetznerbaremetalremediations",
    status = "RemediationStatus",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HetznerBareMetalRemediationSpec {
    #[serde(flatten)]
    pub remediation: RemediationSpec,
}

/// Template for bare-metal remediations created by MachineHealthChecks.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "HetznerBareMetalRemediationTemplate",
    plural = "hetznerbaremetalremediationtemplates",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HetznerBareMetalRemediationTemplateSpec {
    pub template: RemediationTemplateResource,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemediationTemplateResource {
    pub spec: RemediationSpec,
}

/// How a machine is remediated.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemediationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<RemediationStrategy>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemediationStrategy {
    /// Remediation type; only "Reboot" is implemented by the controllers.
    #[serde(default, rename = "type")]
    pub strategy_type: String,

    /// How many times remediation is retried before giving up.
    #[serde(default)]
    pub retry_limit: i32,

    /// Time to wait between retries, e.g. "300s".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Observed state of a remediation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemediationStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    #[serde(default)]
    pub retry_count: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_remediated: Option<String>,
}
