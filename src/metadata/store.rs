use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{BenchError, Result};

/// Key-value document attached to one image.
pub type MetadataDoc = serde_json::Map<String, serde_json::Value>;

/// Attaches metadata documents to image files.
///
/// `write` merges the given top-level keys into whatever is already attached;
/// `replace` discards what is attached and stores `doc` alone;
/// `read` returns an empty document when nothing is attached.
pub trait MetadataStore {
    fn write(&self, image: &Path, doc: &MetadataDoc) -> Result<()>;
    fn replace(&self, image: &Path, doc: &MetadataDoc) -> Result<()>;
    fn read(&self, image: &Path) -> Result<MetadataDoc>;
}

// ---------------------------------------------------------------------------
// SidecarStore
// ---------------------------------------------------------------------------

/// Stores each document as pretty JSON in `<image>.json` next to the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarStore;

impl SidecarStore {
    pub fn sidecar_path(image: &Path) -> PathBuf {
        let mut name: OsString = image.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}

impl MetadataStore for SidecarStore {
    fn write(&self, image: &Path, doc: &MetadataDoc) -> Result<()> {
        let mut merged = self.read(image)?;
        for (k, v) in doc {
            merged.insert(k.clone(), v.clone());
        }
        self.replace(image, &merged)
    }

    fn replace(&self, image: &Path, doc: &MetadataDoc) -> Result<()> {
        let path = SidecarStore::sidecar_path(image);
        let ctx = || format!("writing {}", path.display());
        let file = std::fs::File::create(&path).map_err(|e| BenchError::io(ctx(), e))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, doc).map_err(|e| BenchError::json(ctx(), e))
    }

    fn read(&self, image: &Path) -> Result<MetadataDoc> {
        let path = SidecarStore::sidecar_path(image);
        let ctx = || format!("reading {}", path.display());
        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MetadataDoc::new()),
            Err(e) => return Err(BenchError::io(ctx(), e)),
        };
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| BenchError::json(ctx(), e))
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store, keyed by path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<PathBuf, MetadataDoc>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl MetadataStore for MemoryStore {
    fn write(&self, image: &Path, doc: &MetadataDoc) -> Result<()> {
        let mut docs = self.docs.lock().unwrap_or_else(|p| p.into_inner());
        let entry = docs.entry(image.to_path_buf()).or_default();
        for (k, v) in doc {
            entry.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    fn replace(&self, image: &Path, doc: &MetadataDoc) -> Result<()> {
        let mut docs = self.docs.lock().unwrap_or_else(|p| p.into_inner());
        docs.insert(image.to_path_buf(), doc.clone());
        Ok(())
    }

    fn read(&self, image: &Path) -> Result<MetadataDoc> {
        let docs = self.docs.lock().unwrap_or_else(|p| p.into_inner());
        Ok(docs.get(image).cloned().unwrap_or_default())
    }
}
