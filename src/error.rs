use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Zero or several classification rules matched one path.
    #[error("{path}: expected exactly one matching rule, found {}", matches.len())]
    AmbiguousClassification { path: String, matches: Vec<usize> },

    /// The 1st/99th percentile window is narrower than the configured epsilon.
    /// `path` is filled in once the failing image is known.
    #[error("degenerate image{}: intensity window [{low}, {high}] is below epsilon", located(path))]
    DegenerateImage { path: Option<PathBuf>, low: f64, high: f64 },

    #[error("malformed cell key {key:?}: expected `<component>_<row>,<col>`")]
    MalformedCellKey { key: String },

    #[error("{}: no `_benchmark` metadata", path.display())]
    MissingMetadata { path: PathBuf },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error while {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("image error while {context}: {source}")]
    Image {
        context: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl BenchError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json { context: context.into(), source }
    }

    pub(crate) fn image(context: impl Into<String>, source: image::ImageError) -> Self {
        Self::Image { context: context.into(), source }
    }

    pub(crate) fn regex(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidRegex { pattern: pattern.to_owned(), source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Names the image a path-less error came from.
    pub(crate) fn at(self, image: &Path) -> Self {
        match self {
            Self::DegenerateImage { path: None, low, high } => {
                Self::DegenerateImage { path: Some(image.to_path_buf()), low, high }
            }
            other => other,
        }
    }
}

fn located(path: &Option<PathBuf>) -> String {
    path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, BenchError>;
