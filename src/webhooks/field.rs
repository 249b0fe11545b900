//! Field paths and field-scoped violations.
//!
//! Paths render the way the API server renders them (`spec.sshSpec.secretRef`,
//! `spec.installImage.partitions[0].size`, `spec.hostSelector.matchLabels[zone]`)
//! so that a rejected user can map every message back onto the manifest.

use std::fmt;

/// Path to a field inside a resource, built from the root down.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// Start a path at a top-level field (usually `spec`).
    pub fn new(root: &str) -> Self {
        Self(root.to_string())
    }

    /// Descend into a named child field.
    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    /// Descend into a list element.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    /// Descend into a map entry.
    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}[{}]", self.0, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Category of a field violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationReason {
    /// A required field is empty
    Required,
    /// The value is malformed or out of range
    Invalid,
    /// The value is not one of the supported values
    NotSupported(Vec<String>),
    /// The field must not be set in this configuration
    Forbidden,
}

impl ViolationReason {
    /// Machine-readable cause reason as used in API `Status` details.
    pub fn cause(&self) -> &'static str {
        match self {
            ViolationReason::Required => "FieldValueRequired",
            ViolationReason::Invalid => "FieldValueInvalid",
            ViolationReason::NotSupported(_) => "FieldValueNotSupported",
            ViolationReason::Forbidden => "FieldValueForbidden",
        }
    }
}

/// One independent, field-scoped reason a candidate is invalid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: FieldPath,
    pub reason: ViolationReason,
    /// Offending value, rendered for the message
    pub value: Option<String>,
    /// Human-readable detail
    pub detail: String,
}

impl FieldViolation {
    pub fn required(path: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            path,
            reason: ViolationReason::Required,
            value: None,
            detail: detail.into(),
        }
    }

    pub fn invalid(path: FieldPath, value: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self {
            path,
            reason: ViolationReason::Invalid,
            value: Some(value.to_string()),
            detail: detail.into(),
        }
    }

    pub fn not_supported<S: AsRef<str>>(
        path: FieldPath,
        value: impl fmt::Display,
        supported: &[S],
    ) -> Self {
        Self {
            path,
            reason: ViolationReason::NotSupported(
                supported.iter().map(|s| s.as_ref().to_string()).collect(),
            ),
            value: Some(value.to_string()),
            detail: String::new(),
        }
    }

    pub fn forbidden(path: FieldPath, detail: impl Into<String>) -> Self {
        Self {
            path,
            reason: ViolationReason::Forbidden,
            value: None,
            detail: detail.into(),
        }
    }

    /// Violation for a changed immutable subtree. The offending value is not
    /// rendered: subtrees can be large.
    pub fn immutable(path: FieldPath, field: &str) -> Self {
        Self {
            path,
            reason: ViolationReason::Invalid,
            value: None,
            detail: format!("{} is immutable", field),
        }
    }

    /// Message without the leading field path.
    pub fn body(&self) -> String {
        match &self.reason {
            ViolationReason::Required => with_detail("Required value".to_string(), &self.detail),
            ViolationReason::Forbidden => with_detail("Forbidden".to_string(), &self.detail),
            ViolationReason::Invalid => {
                let head = match &self.value {
                    Some(v) => format!("Invalid value: {:?}", v),
                    None => "Invalid value".to_string(),
                };
                with_detail(head, &self.detail)
            }
            ViolationReason::NotSupported(supported) => {
                let value = self.value.as_deref().unwrap_or_default();
                let mut msg = format!("Unsupported value: {:?}", value);
                if !supported.is_empty() {
                    let quoted: Vec<String> = supported.iter().map(|s| format!("{:?}", s)).collect();
                    msg.push_str(&format!(": supported values: {}", quoted.join(", ")));
                }
                with_detail(msg, &self.detail)
            }
        }
    }
}

fn with_detail(head: String, detail: &str) -> String {
    if detail.is_empty() {
        head
    } else {
        format!("{}: {}", head, detail)
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.body())
    }
}
