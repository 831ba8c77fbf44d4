//! Stand-alone raw-to-PNG conversion: normalization without ground truth.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::Result;
use crate::files::{common_prefix, output_path};
use crate::imaging::{load_raw, normalize, save_png, TargetSize};
use crate::pipeline::prepare::PassOutcome;
use crate::pipeline::{with_pool, Tick};

/// Converts `inputs` to PNG under `out_dir`, dropping their common prefix
/// from the output names.
pub fn convert_files(
    inputs: &[PathBuf],
    out_dir: &Path,
    target: Option<TargetSize>,
    epsilon: f64,
    threads: Option<usize>,
    tick: Tick<'_>,
) -> Result<PassOutcome> {
    let prefix = common_prefix(inputs);
    let results = with_pool(threads, || {
        inputs
            .par_iter()
            .map(|input| {
                let output = output_path(out_dir, input, &prefix);
                let result = load_raw(input)
                    .and_then(|raw| normalize(&raw, target, epsilon).map_err(|e| e.at(input)))
                    .and_then(|img| save_png(&output, &img))
                    .map(|()| output);
                tick();
                (input.clone(), result)
            })
            .collect::<Vec<_>>()
    })?;
    Ok(PassOutcome::from_results(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma};

    #[test]
    fn converts_and_strips_common_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = Vec::new();
        for name in ["scan_a/1.png", "scan_b/2.png"] {
            let path = dir.path().join("raw").join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            let buf: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_fn(5, 5, |x, y| Luma([(x * 40 + y) as u8]));
            buf.save(&path).unwrap();
            inputs.push(path);
        }

        let out = dir.path().join("png");
        let outcome = convert_files(&inputs, &out, None, 0.001, None, &|| {}).unwrap();
        assert!(outcome.failed.is_empty());
        assert!(out.join("a/1.png").is_file());
        assert!(out.join("b/2.png").is_file());
    }
}
