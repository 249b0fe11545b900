//! Error types for the admission engine.
//!
//! Only structural problems surface as `Error`: a candidate of the wrong kind,
//! an operation the webhook does not serve, or a manifest that cannot be
//! decoded. Rule violations are never errors; they travel inside an
//! [`AdmissionOutcome`](crate::webhooks::AdmissionOutcome).

use std::path::PathBuf;
use thiserror::Error;

/// Error type for admission operations
#[derive(Error, Debug)]
pub enum Error {
    /// The caller handed over something the webhook cannot interpret
    #[error("bad request: {0}")]
    BadRequest(String),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML manifest could not be decoded
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Manifest file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }

    /// Check if this error is a contract violation between caller and webhook
    /// rather than an I/O or decoding failure
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Error::BadRequest(_))
    }
}

/// Result type alias for admission operations
pub type Result<T> = std::result::Result<T, Error>;
