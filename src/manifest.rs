//! Decoding manifests into typed admission objects.
//!
//! Accepts YAML or JSON (JSON is read through the YAML parser). The
//! `apiVersion` and `kind` fields pick the concrete type; anything this crate
//! does not admit is a bad request.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::webhooks::object::{AdmissionObject, ResourceKind, api_version};

/// Decode one manifest document.
pub fn parse_object(text: &str) -> Result<AdmissionObject> {
    let value: Value = serde_yaml::from_str(text)?;
    from_value(value)
}

/// Read and decode a manifest file.
pub fn read_object(path: &Path) -> Result<AdmissionObject> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_object(&text)
}

/// Decode an already-parsed manifest.
pub fn from_value(value: Value) -> Result<AdmissionObject> {
    let found_version = value.get("apiVersion").and_then(Value::as_str).unwrap_or_default();
    let found_kind = value.get("kind").and_then(Value::as_str).unwrap_or_default();

    let expected_version = api_version();
    if found_version != expected_version {
        return Err(Error::bad_request(format!(
            "unsupported apiVersion {:?}, expected {:?}",
            found_version, expected_version
        )));
    }
    let kind = ResourceKind::from_kind(found_kind)
        .ok_or_else(|| Error::bad_request(format!("unsupported kind {:?}", found_kind)))?;

    let obj = match kind {
        ResourceKind::HetznerBareMetalMachine => {
            AdmissionObject::HetznerBareMetalMachine(decode(value)?)
        }
        ResourceKind::HetznerClusterTemplate => {
            AdmissionObject::HetznerClusterTemplate(decode(value)?)
        }
        ResourceKind::HCloudRemediation => AdmissionObject::HCloudRemediation(decode(value)?),
        ResourceKind::HetznerBareMetalRemediation => {
            AdmissionObject::HetznerBareMetalRemediation(decode(value)?)
        }
        ResourceKind::HetznerBareMetalRemediationTemplate => {
            AdmissionObject::HetznerBareMetalRemediationTemplate(decode(value)?)
        }
    };
    Ok(obj)
}

fn decode<K: DeserializeOwned>(value: Value) -> Result<K> {
    Ok(serde_json::from_value(value)?)
}
