use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::metadata::store::{MetadataDoc, MetadataStore};
use crate::shape::GridShape;

/// Reserved top-level key holding the ground truth of a sample image.
pub const BENCHMARK_KEY: &str = "_benchmark";

/// Ground truth attached to a sample image when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    pub shape: Vec<GridShape>,
}

/// Starts a fresh document for `image` holding only `meta` under
/// [`BENCHMARK_KEY`]. Anything attached earlier, such as extraction output
/// from a previous run, is dropped.
pub fn write_benchmark(
    store: &(impl MetadataStore + ?Sized),
    image: &Path,
    meta: &BenchmarkMetadata,
) -> Result<()> {
    let value = serde_json::to_value(meta)
        .map_err(|e| BenchError::json(format!("encoding metadata for {}", image.display()), e))?;
    let mut doc = MetadataDoc::new();
    doc.insert(BENCHMARK_KEY.to_owned(), value);
    store.replace(image, &doc)
}

/// Extracts the ground truth from a document previously read for `image`.
pub fn read_benchmark(doc: &MetadataDoc, image: &Path) -> Result<BenchmarkMetadata> {
    let value = doc
        .get(BENCHMARK_KEY)
        .ok_or_else(|| BenchError::MissingMetadata { path: image.to_path_buf() })?;
    BenchmarkMetadata::deserialize(value)
        .map_err(|e| BenchError::json(format!("decoding metadata of {}", image.display()), e))
}
