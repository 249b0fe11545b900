//! Aggregation of field violations into one admission outcome.

use std::fmt;

use kube::Resource;
use kube::ResourceExt;
use kube::core::response::{Status, StatusCause, StatusDetails};

use super::field::FieldViolation;

/// HTTP code the API server uses for `Invalid` status errors
pub const INVALID_STATUS_CODE: u16 = 422;

/// Identity of the resource under admission, used for reporting only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceIdentity {
    pub group: String,
    pub kind: String,
    pub name: String,
}

impl ResourceIdentity {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Identity of a typed resource.
    pub fn of<K: Resource<DynamicType = ()>>(obj: &K) -> Self {
        Self::new(K::group(&()), K::kind(&()), obj.name_any())
    }

    /// `Kind.group`, or just `Kind` for the core group
    pub fn group_kind(&self) -> String {
        if self.group.is_empty() {
            self.kind.clone()
        } else {
            format!("{}.{}", self.kind, self.group)
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.group_kind(), self.name)
    }
}

/// Everything one pass of validators found: violations plus non-fatal warnings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub violations: Vec<FieldViolation>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: FieldViolation) {
        self.violations.push(violation);
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

impl From<Vec<FieldViolation>> for ValidationResult {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self {
            violations,
            warnings: Vec::new(),
        }
    }
}

/// A rejected admission. Always holds at least one violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    identity: ResourceIdentity,
    violations: Vec<FieldViolation>,
    warnings: Vec<String>,
}

impl Rejection {
    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// API-server style `Invalid` status carrying one cause per violation.
    pub fn to_status(&self) -> Status {
        let mut status = Status::failure(&self.to_string(), "Invalid").with_code(INVALID_STATUS_CODE);
        status.details = Some(StatusDetails {
            name: self.identity.name.clone(),
            group: self.identity.group.clone(),
            kind: self.identity.kind.clone(),
            causes: self
                .violations
                .iter()
                .map(|v| StatusCause {
                    reason: v.reason.cause().to_string(),
                    message: v.body(),
                    field: v.path.to_string(),
                })
                .collect(),
            uid: String::new(),
            retry_after_seconds: 0,
        });
        status
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is invalid: ", self.identity)?;
        match self.violations.as_slice() {
            [single] => write!(f, "{}", single),
            many => {
                let rendered: Vec<String> = many.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// Accept/reject decision for one admission attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionOutcome {
    Accepted { warnings: Vec<String> },
    Rejected(Rejection),
}

impl AdmissionOutcome {
    /// Accept with no warnings.
    pub fn accepted() -> Self {
        AdmissionOutcome::Accepted {
            warnings: Vec::new(),
        }
    }

    /// Turn the findings of one admission attempt into an outcome. Violations
    /// are kept in the order the validators produced them.
    pub fn aggregate(identity: ResourceIdentity, result: ValidationResult) -> Self {
        let ValidationResult {
            violations,
            warnings,
        } = result;
        if violations.is_empty() {
            AdmissionOutcome::Accepted { warnings }
        } else {
            AdmissionOutcome::Rejected(Rejection {
                identity,
                violations,
                warnings,
            })
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, AdmissionOutcome::Accepted { .. })
    }

    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            AdmissionOutcome::Accepted { .. } => &[],
            AdmissionOutcome::Rejected(rejection) => rejection.violations(),
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            AdmissionOutcome::Accepted { warnings } => warnings,
            AdmissionOutcome::Rejected(rejection) => rejection.warnings(),
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AdmissionOutcome::Accepted { .. } => None,
            AdmissionOutcome::Rejected(rejection) => Some(rejection),
        }
    }
}
