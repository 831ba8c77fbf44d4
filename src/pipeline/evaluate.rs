//! Evaluation pass: rebuild detected grids from extraction output stored in
//! each sample's metadata and score them against the ground truth.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::{BenchError, Result};
use crate::metadata::{read_benchmark, MetadataDoc, MetadataStore};
use crate::pipeline::{with_pool, Tick};
use crate::report::{column_kind, ColumnKind, ImageMetrics, ReportValue};
use crate::validate::{reconstruct, validate};

/// Scores one metadata document.
///
/// Each detection key (`.../cells`) must hold an object whose keys are cell
/// keys; a malformed key or value fails the whole image rather than yield a
/// partial row.
pub fn evaluate_document(identity: &str, doc: &MetadataDoc, path: &Path) -> Result<ImageMetrics> {
    let truth = read_benchmark(doc, path)?;
    let mut metrics = ImageMetrics::new(identity, truth.kind.clone());

    for (key, value) in doc.iter().filter(|(k, _)| column_kind(k) == ColumnKind::Indicator) {
        let cells = value.as_object().ok_or_else(|| {
            BenchError::invalid_input(format!("{}: `{}` is not a cell mapping", path.display(), key))
        })?;
        let detected = reconstruct(cells.keys())?;
        let result = validate(&detected, &truth.shape);
        log::trace!("{} {}: {:?}", identity, key, result);
        metrics.push_detection(key, &result);
    }

    for (key, value) in doc.iter().filter(|(k, _)| column_kind(k) == ColumnKind::ErrorMagnitude) {
        if let Some(v) = ReportValue::from_json(value) {
            metrics.push_error(key, v);
        }
    }

    Ok(metrics)
}

/// Reads `path`'s metadata from `store` and scores it.
pub fn evaluate_image(path: &Path, store: &(dyn MetadataStore + Sync)) -> Result<ImageMetrics> {
    let doc = store.read(path)?;
    evaluate_document(&path.to_string_lossy(), &doc, path)
}

/// Scores every image in parallel, keeping input order. Images that fail are
/// logged and left out of the returned metrics.
pub fn evaluate_corpus(
    paths: &[PathBuf],
    store: &(dyn MetadataStore + Sync),
    threads: Option<usize>,
    tick: Tick<'_>,
) -> Result<(Vec<ImageMetrics>, Vec<(PathBuf, BenchError)>)> {
    let results = with_pool(threads, || {
        paths
            .par_iter()
            .map(|path| {
                let result = evaluate_image(path, store);
                tick();
                (path.clone(), result)
            })
            .collect::<Vec<_>>()
    })?;

    let mut metrics = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for (path, result) in results {
        match result {
            Ok(m) => metrics.push(m),
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                failed.push((path, e));
            }
        }
    }
    log::info!("evaluated {} images, {} failed", metrics.len(), failed.len());
    Ok((metrics, failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{write_benchmark, BenchmarkMetadata, MemoryStore};
    use crate::shape::GridShape;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> MetadataDoc {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn truth() -> serde_json::Value {
        json!({"type": "T", "shape": [[2, 2], [1, 3]]})
    }

    #[test]
    fn scores_detections_and_copies_errors() {
        let d = doc(json!({
            "_benchmark": truth(),
            "a/cells": {"1_0,0": null, "1_0,1": null, "1_1,0": null, "1_1,1": null,
                         "2_0,0": null, "2_0,1": null, "2_0,2": null},
            "b/cells": {"1_0,0": null, "1_1,1": null},
            "a/cells_rmse": 0.75,
            "note": "ignored"
        }));
        let m = evaluate_document("x.png", &d, Path::new("x.png")).unwrap();
        assert_eq!(m.kind, "T");
        assert_eq!(m.get("a/cells_shapeokay"), Some(&ReportValue::Int(1)));
        assert_eq!(m.get("a/cells_extra"), Some(&ReportValue::Int(0)));
        assert_eq!(m.get("b/cells_shapeokay"), Some(&ReportValue::Int(0)));
        assert_eq!(m.get("b/cells_extra"), Some(&ReportValue::Int(-1)));
        assert_eq!(m.get("a/cells_rmse"), Some(&ReportValue::Float(0.75)));
        assert_eq!(m.get("note"), None);
    }

    #[test]
    fn malformed_key_fails_the_image() {
        let d = doc(json!({"_benchmark": truth(), "a/cells": {"1_0,0": null, "1_0": null}}));
        assert!(matches!(
            evaluate_document("x", &d, Path::new("x")),
            Err(BenchError::MalformedCellKey { .. })
        ));
    }

    #[test]
    fn non_object_cells_fail_the_image() {
        let d = doc(json!({"_benchmark": truth(), "a/cells": [1, 2]}));
        assert!(matches!(evaluate_document("x", &d, Path::new("x")), Err(BenchError::InvalidInput { .. })));
    }

    #[test]
    fn corpus_keeps_order_and_skips_failures() {
        let store = MemoryStore::new();
        let meta = BenchmarkMetadata { kind: "T".into(), shape: vec![GridShape::new(1, 2)] };
        let paths: Vec<PathBuf> = ["a.png", "b.png", "c.png"].iter().map(PathBuf::from).collect();
        write_benchmark(&store, &paths[0], &meta).unwrap();
        write_benchmark(&store, &paths[2], &meta).unwrap();

        let (metrics, failed) = evaluate_corpus(&paths, &store, None, &|| {}).unwrap();
        assert_eq!(metrics.iter().map(|m| m.identity.as_str()).collect::<Vec<_>>(), vec!["a.png", "c.png"]);
        assert_eq!(failed.len(), 1);
        assert!(matches!(failed[0].1, BenchError::MissingMetadata { .. }));
    }
}
