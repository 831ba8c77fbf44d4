use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::shape::GridShape;

/// Outcome of comparing detected components with the ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Every distinct expected shape was detected at least once.
    pub shape_okay: bool,
    /// Detected minus expected component count. Negative when components are
    /// missing, despite the name.
    pub extra_count: i64,
}

/// Compares detected shapes with the expected ones as sets of oriented shapes.
///
/// Duplicates count once for `shape_okay` but fully for `extra_count`.
/// Orientation is ignored, so a transposed grid passes.
pub fn validate(detected: &BTreeMap<u64, GridShape>, expected: &[GridShape]) -> ValidationResult {
    let detected_set: BTreeSet<GridShape> = detected.values().map(|s| s.oriented()).collect();
    let expected_set: BTreeSet<GridShape> = expected.iter().map(|s| s.oriented()).collect();

    ValidationResult {
        shape_okay: expected_set.is_subset(&detected_set),
        extra_count: detected.len() as i64 - expected.len() as i64,
    }
}
