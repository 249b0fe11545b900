//! hetzner-admission library crate
//!
//! Admission defaulting and validation for Hetzner Cluster API
//! infrastructure resources. This module exports the CRD definitions, the
//! per-kind admission webhooks and manifest decoding.
//!
//! Everything here is pure and synchronous: a webhook holds no state between
//! calls, so requests may be admitted concurrently and retried freely.

pub mod crd;
pub mod error;
pub mod manifest;
pub mod webhooks;

pub use error::{Error, Result};
pub use webhooks::{
    Admission, AdmissionObject, AdmissionOutcome, AdmissionWebhook, FieldViolation, Operation,
    Rejection, ResourceIdentity, ResourceKind,
};
