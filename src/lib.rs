pub mod classify;
pub mod error;
pub mod files;
pub mod imaging;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod sample;
pub mod shape;
pub mod table;
pub mod validate;

// Convenience re-exports
pub use classify::{classify, ClassificationRule, RuleTable};
pub use error::{BenchError, Result};
pub use imaging::{normalize, NormalizedImage, RawImage, TargetSize};
pub use metadata::{BenchmarkMetadata, MetadataStore, SidecarStore};
pub use pipeline::PipelineConfig;
pub use report::{aggregate, BenchmarkReport, ImageMetrics};
pub use sample::{stratified_sample, SampleItem, SampleSet};
pub use shape::GridShape;
pub use validate::{reconstruct, validate, ValidationResult};
