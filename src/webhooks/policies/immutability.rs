//! Immutability validation policy.
//!
//! Only enforced on UPDATE operations.
//!
//! Compares old and new subtrees by their canonical JSON form, so equality is
//! value equality over the whole subtree regardless of how the structs are
//! laid out in memory. A changed subtree yields exactly one violation naming
//! the top-level field, never one per differing leaf.

use serde::Serialize;

use crate::webhooks::field::{FieldPath, FieldViolation};

/// Whether two subtrees are semantically equal.
///
/// A subtree that cannot be rendered to JSON is treated as changed.
pub fn unchanged<T: Serialize + ?Sized>(old: &T, new: &T) -> bool {
    match (serde_json::to_value(old), serde_json::to_value(new)) {
        (Ok(old), Ok(new)) => old == new,
        _ => false,
    }
}

/// Report `field` at `path` if the subtree changed.
pub fn check<T: Serialize + ?Sized>(
    path: FieldPath,
    field: &str,
    old: &T,
    new: &T,
) -> Option<FieldViolation> {
    if unchanged(old, new) {
        None
    } else {
        Some(FieldViolation::immutable(path, field))
    }
}
