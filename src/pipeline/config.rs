use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::imaging::{TargetSize, DEFAULT_EPSILON};

/// Settings for the sampling and report passes.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of the raw image corpus.
    pub input_dir: PathBuf,
    /// Only files whose path matches this (from the start) are considered.
    pub file_regex: String,
    /// Rule table with `regex`, `type` and `shape` columns.
    pub rules: PathBuf,
    /// Classified paths matching any of these are dropped before sampling.
    pub exclude: Vec<String>,
    pub per_type_cap: usize,
    pub seed: u64,
    pub output_dir: PathBuf,
    pub manifest: PathBuf,
    pub target_shape: Option<TargetSize>,
    pub epsilon: f64,
    /// Worker count; `None` uses one per core.
    pub threads: Option<usize>,
    /// Abort when any path fails classification instead of skipping it.
    pub strict: bool,
    pub report: PathBuf,
    /// Files under `output_dir` that the report pass evaluates.
    pub sample_regex: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_dir: PathBuf::from("dst"),
            file_regex: ".*".into(),
            rules: PathBuf::from("sample4benchmark.csv"),
            exclude: Vec::new(),
            per_type_cap: 500,
            seed: 0,
            output_dir: PathBuf::from("sample_benchmark"),
            manifest: PathBuf::from("sample_benchmark.csv.gz"),
            target_shape: None,
            epsilon: DEFAULT_EPSILON,
            threads: None,
            strict: false,
            report: PathBuf::from("benchmark.csv.gz"),
            sample_regex: r".*\.png".into(),
        }
    }
}

impl PipelineConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let ctx = || format!("writing {}", path.display());
        let file = std::fs::File::create(path).map_err(|e| BenchError::io(ctx(), e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| BenchError::json(ctx(), e))
    }

    /// Deserializes a config previously written by `save_json` (or by hand).
    pub fn load_json(path: &Path) -> Result<PipelineConfig> {
        let ctx = || format!("reading {}", path.display());
        let file = std::fs::File::open(path).map_err(|e| BenchError::io(ctx(), e))?;
        let reader = std::io::BufReader::new(file);
        let config: PipelineConfig = serde_json::from_reader(reader).map_err(|e| BenchError::json(ctx(), e))?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        if !(self.epsilon >= 0.0) {
            return Err(BenchError::invalid_input(format!("epsilon must be >= 0, got {}", self.epsilon)));
        }
        if self.threads == Some(0) {
            return Err(BenchError::invalid_input("threads must be at least 1"));
        }
        if let Some(t) = self.target_shape {
            if t.width == 0 || t.height == 0 {
                return Err(BenchError::invalid_input("target_shape must be non-zero"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"per_type_cap": 10, "target_shape": {"width": 64, "height": 32}}"#).unwrap();

        let config = PipelineConfig::load_json(&path).unwrap();
        assert_eq!(config.per_type_cap, 10);
        assert_eq!(config.target_shape, Some(TargetSize { width: 64, height: 32 }));
        assert_eq!(config.epsilon, DEFAULT_EPSILON);
        assert_eq!(config.output_dir, PathBuf::from("sample_benchmark"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let config = PipelineConfig {
            exclude: vec![".*03_bilder.*".into()],
            seed: 99,
            threads: Some(2),
            ..PipelineConfig::default()
        };
        config.save_json(&path).unwrap();
        assert_eq!(PipelineConfig::load_json(&path).unwrap(), config);
    }

    #[test]
    fn rejects_zero_threads() {
        let config = PipelineConfig { threads: Some(0), ..PipelineConfig::default() };
        assert!(config.check().is_err());
    }
}
