use std::path::PathBuf;

use crate::classify::ClassificationRule;
use crate::metadata::BenchmarkMetadata;
use crate::shape::GridShape;

/// A classified source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleItem {
    pub path: PathBuf,
    /// Pattern of the rule that classified this path.
    pub pattern: String,
    pub kind: String,
    pub expected_shape: Vec<GridShape>,
}

impl SampleItem {
    pub fn from_rule(path: PathBuf, rule: &ClassificationRule) -> SampleItem {
        SampleItem {
            path,
            pattern: rule.pattern.clone(),
            kind: rule.kind.clone(),
            expected_shape: rule.expected_shape.clone(),
        }
    }

    /// Ground truth recorded alongside the normalized sample.
    pub fn metadata(&self) -> BenchmarkMetadata {
        BenchmarkMetadata {
            kind: self.kind.clone(),
            shape: self.expected_shape.clone(),
        }
    }
}
