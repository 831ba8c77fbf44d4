pub mod aggregate;
pub mod metrics;

pub use aggregate::{aggregate, BenchmarkReport};
pub use metrics::{column_kind, ColumnKind, ImageMetrics, ReportValue, DETECTION_MARKER, ERROR_MARKER};
