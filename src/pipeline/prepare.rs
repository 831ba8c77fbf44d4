//! Sample creation: classify the corpus, draw a balanced sample, then
//! normalize each sampled image and attach its ground truth.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::classify::{classify_all, load_rules};
use crate::error::{BenchError, Result};
use crate::files::{list_files, output_path, path_regex};
use crate::imaging::{load_raw, normalize, save_png, TargetSize};
use crate::metadata::{write_benchmark, MetadataStore};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::{with_pool, Tick};
use crate::sample::{stratified_sample, SampleItem, SampleSet};

/// Result of a corpus-wide pass: outputs produced and inputs that failed.
#[derive(Debug, Default)]
pub struct PassOutcome {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, BenchError)>,
}

impl PassOutcome {
    pub(crate) fn from_results(results: Vec<(PathBuf, Result<PathBuf>)>) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for (input, result) in results {
            match result {
                Ok(out) => outcome.written.push(out),
                Err(e) => {
                    log::warn!("{}: {}", input.display(), e);
                    outcome.failed.push((input, e));
                }
            }
        }
        outcome
    }
}

/// Lists, classifies, filters and samples the raw corpus.
pub fn select_samples(config: &PipelineConfig) -> Result<SampleSet> {
    let rules = load_rules(&config.rules)?;
    let files = list_files(&config.input_dir, &config.file_regex)?;
    let listed = files.len();

    let (items, failures) = classify_all(files, &rules);
    if config.strict {
        if let Some(first) = failures.into_iter().next() {
            return Err(first);
        }
    } else if !failures.is_empty() {
        log::warn!("{} of {} files could not be classified", failures.len(), listed);
    }

    let excludes = config
        .exclude
        .iter()
        .map(|p| path_regex(p))
        .collect::<Result<Vec<_>>>()?;
    let kept: Vec<SampleItem> = items
        .into_iter()
        .filter(|item| {
            let path = item.path.to_string_lossy();
            !excludes.iter().any(|re| re.is_match(&path))
        })
        .collect();

    let set = stratified_sample(&kept, config.per_type_cap, config.seed);
    log::info!(
        "sampled {} of {} classified files across {} types",
        set.len(),
        kept.len(),
        set.groups().len()
    );
    Ok(set)
}

/// Normalizes one source image into `output` and attaches its ground truth.
pub fn prepare_sample(
    item: &SampleItem,
    output: &Path,
    target: Option<TargetSize>,
    epsilon: f64,
    store: &(dyn MetadataStore + Sync),
) -> Result<PathBuf> {
    let raw = load_raw(&item.path)?;
    let image = normalize(&raw, target, epsilon).map_err(|e| e.at(&item.path))?;
    save_png(output, &image)?;
    write_benchmark(store, output, &item.metadata())?;
    log::debug!("{} -> {}", item.path.display(), output.display());
    Ok(output.to_path_buf())
}

/// Prepares every item in parallel. A failing item is logged and skipped;
/// it never stops the others.
///
/// Two inputs that map onto the same output file (`a/x.tif` and `a/x.jpg`)
/// would race on the PNG and its metadata, so every item after the first
/// claiming an output is failed before the pool starts.
pub fn prepare_samples(
    items: &[SampleItem],
    config: &PipelineConfig,
    store: &(dyn MetadataStore + Sync),
    tick: Tick<'_>,
) -> Result<PassOutcome> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut jobs = Vec::with_capacity(items.len());
    let mut collisions = Vec::new();
    for item in items {
        let output = output_path(&config.output_dir, &item.path, "");
        match claimed.get(&output) {
            Some(first) => {
                let message = format!("{} is already produced from {}", output.display(), first.display());
                collisions.push((item.path.clone(), Err(BenchError::invalid_input(message))));
                tick();
            }
            None => {
                claimed.insert(output.clone(), &item.path);
                jobs.push((item, output));
            }
        }
    }

    let mut results = with_pool(config.threads, || {
        jobs.par_iter()
            .map(|(item, output)| {
                let result = prepare_sample(item, output, config.target_shape, config.epsilon, store);
                tick();
                (item.path.clone(), result)
            })
            .collect::<Vec<_>>()
    })?;
    results.extend(collisions);

    let outcome = PassOutcome::from_results(results);
    log::info!("prepared {} samples, {} failed", outcome.written.len(), outcome.failed.len());
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{read_benchmark, MemoryStore};
    use crate::shape::GridShape;
    use image::{ImageBuffer, Luma};

    fn write_gradient(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(8, 4, |x, y| Luma([(x * 500 + y * 100) as u16]));
        buf.save(path).unwrap();
    }

    fn write_flat(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let buf: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(4, 4, Luma([9]));
        buf.save(path).unwrap();
    }

    fn item(path: PathBuf) -> SampleItem {
        SampleItem {
            path,
            pattern: ".*".into(),
            kind: "A".into(),
            expected_shape: vec![GridShape::new(2, 3)],
        }
    }

    #[test]
    fn failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("raw/good.png");
        let flat = dir.path().join("raw/flat.png");
        write_gradient(&good);
        write_flat(&flat);
        let missing = dir.path().join("raw/missing.png");

        let config = PipelineConfig {
            output_dir: dir.path().join("out"),
            target_shape: Some(TargetSize { width: 4, height: 2 }),
            threads: Some(2),
            ..PipelineConfig::default()
        };
        let store = MemoryStore::new();
        let items = vec![item(good.clone()), item(flat.clone()), item(missing.clone())];
        let outcome = prepare_samples(&items, &config, &store, &|| {}).unwrap();

        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.failed.len(), 2);
        assert!(outcome
            .failed
            .iter()
            .any(|(p, e)| p == &flat
                && matches!(e, BenchError::DegenerateImage { path: Some(named), .. } if named == &flat)));
        assert!(outcome.failed.iter().any(|(p, e)| p == &missing && matches!(e, BenchError::Io { .. })));

        let written = &outcome.written[0];
        let raw = load_raw(written).unwrap();
        assert_eq!((raw.width, raw.height), (4, 2));
        let doc = store.read(written).unwrap();
        assert_eq!(read_benchmark(&doc, written).unwrap(), items[0].metadata());
    }

    #[test]
    fn colliding_outputs_keep_the_first_input() {
        let dir = tempfile::tempdir().unwrap();
        let tif = dir.path().join("raw/x.tif");
        let png = dir.path().join("raw/x.png");
        write_gradient(&tif);
        write_gradient(&png);

        let config = PipelineConfig {
            output_dir: dir.path().join("out"),
            threads: Some(2),
            ..PipelineConfig::default()
        };
        let store = MemoryStore::new();
        let items = vec![item(tif.clone()), item(png.clone())];
        let outcome = prepare_samples(&items, &config, &store, &|| {}).unwrap();

        assert_eq!(outcome.written.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, png);
        assert!(matches!(outcome.failed[0].1, BenchError::InvalidInput { .. }));
    }
}
