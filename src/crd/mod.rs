//! Custom Resource Definitions admitted by hetzner-admission.
//!
//! - `HetznerBareMetalMachine`: bare-metal host provisioned via installimage
//! - `HetznerClusterTemplate`: ClusterClass template for HetznerCluster
//! - `HCloudRemediation`, `HetznerBareMetalRemediation`,
//!   `HetznerBareMetalRemediationTemplate`: machine remediation requests

mod bare_metal_machine;
mod cluster_template;
mod remediation;

pub use bare_metal_machine::*;
pub use cluster_template::*;
pub use remediation::*;
