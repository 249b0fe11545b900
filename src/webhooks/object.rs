//! Typed admission candidates.
//!
//! Every kind this crate admits is one variant of [`AdmissionObject`]; rule
//! sets are selected by matching on the variant rather than through a shared
//! trait hierarchy, since the kinds share nothing beyond the outcome contract.

use std::fmt;

use kube::Resource;

use super::outcome::ResourceIdentity;
use crate::crd::{
    HCloudRemediation, HetznerBareMetalMachine, HetznerBareMetalRemediation,
    HetznerBareMetalRemediationTemplate, HetznerClusterTemplate,
};

/// API group shared by all admitted kinds
pub const GROUP: &str = "infrastructure.cluster.x-k8s.io";

/// API version shared by all admitted kinds
pub const VERSION: &str = "v1beta1";

/// Kinds with admission rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    HetznerBareMetalMachine,
    HetznerClusterTemplate,
    HCloudRemediation,
    HetznerBareMetalRemediation,
    HetznerBareMetalRemediationTemplate,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::HetznerBareMetalMachine,
        ResourceKind::HetznerClusterTemplate,
        ResourceKind::HCloudRemediation,
        ResourceKind::HetznerBareMetalRemediation,
        ResourceKind::HetznerBareMetalRemediationTemplate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::HetznerBareMetalMachine => "HetznerBareMetalMachine",
            ResourceKind::HetznerClusterTemplate => "HetznerClusterTemplate",
            ResourceKind::HCloudRemediation => "HCloudRemediation",
            ResourceKind::HetznerBareMetalRemediation => "HetznerBareMetalRemediation",
            ResourceKind::HetznerBareMetalRemediationTemplate => {
                "HetznerBareMetalRemediationTemplate"
            }
        }
    }

    /// Look a kind up by its `kind` string.
    pub fn from_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == kind)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate or prior object, tagged with its kind.
#[derive(Clone, Debug)]
pub enum AdmissionObject {
    HetznerBareMetalMachine(HetznerBareMetalMachine),
    HetznerClusterTemplate(HetznerClusterTemplate),
    HCloudRemediation(HCloudRemediation),
    HetznerBareMetalRemediation(HetznerBareMetalRemediation),
    HetznerBareMetalRemediationTemplate(HetznerBareMetalRemediationTemplate),
}

impl AdmissionObject {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AdmissionObject::HetznerBareMetalMachine(_) => ResourceKind::HetznerBareMetalMachine,
            AdmissionObject::HetznerClusterTemplate(_) => ResourceKind::HetznerClusterTemplate,
            AdmissionObject::HCloudRemediation(_) => ResourceKind::HCloudRemediation,
            AdmissionObject::HetznerBareMetalRemediation(_) => {
                ResourceKind::HetznerBareMetalRemediation
            }
            AdmissionObject::HetznerBareMetalRemediationTemplate(_) => {
                ResourceKind::HetznerBareMetalRemediationTemplate
            }
        }
    }

    pub fn identity(&self) -> ResourceIdentity {
        match self {
            AdmissionObject::HetznerBareMetalMachine(o) => ResourceIdentity::of(o),
            AdmissionObject::HetznerClusterTemplate(o) => ResourceIdentity::of(o),
            AdmissionObject::HCloudRemediation(o) => ResourceIdentity::of(o),
            AdmissionObject::HetznerBareMetalRemediation(o) => ResourceIdentity::of(o),
            AdmissionObject::HetznerBareMetalRemediationTemplate(o) => ResourceIdentity::of(o),
        }
    }

    /// Object metadata name, empty when unset (e.g. `generateName` creates).
    pub fn name(&self) -> String {
        self.identity().name
    }

    /// Serialize the object back into its manifest form.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            AdmissionObject::HetznerBareMetalMachine(o) => serde_json::to_value(o),
            AdmissionObject::HetznerClusterTemplate(o) => serde_json::to_value(o),
            AdmissionObject::HCloudRemediation(o) => serde_json::to_value(o),
            AdmissionObject::HetznerBareMetalRemediation(o) => serde_json::to_value(o),
            AdmissionObject::HetznerBareMetalRemediationTemplate(o) => serde_json::to_value(o),
        }
    }
}

macro_rules! impl_from_resource {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for AdmissionObject {
                fn from(obj: $ty) -> Self {
                    AdmissionObject::$ty(obj)
                }
            }
        )*
    };
}

impl_from_resource!(
    HetznerBareMetalMachine,
    HetznerClusterTemplate,
    HCloudRemediation,
    HetznerBareMetalRemediation,
    HetznerBareMetalRemediationTemplate,
);

/// `apiVersion` string of every admitted kind
pub fn api_version() -> String {
    HetznerBareMetalMachine::api_version(&()).into_owned()
}
