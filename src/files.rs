use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::error::{BenchError, Result};

/// Compiles `pattern` so it must match from the start of a path.
pub fn path_regex(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", pattern)).map_err(|e| BenchError::regex(pattern, e))
}

/// Every file under `root` (recursively) whose path matches `pattern`,
/// sorted. Symlinked directories are followed.
pub fn list_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let regex = path_regex(pattern)?;
    std::fs::metadata(root).map_err(|e| BenchError::io(format!("listing {}", root.display()), e))?;

    let walk = format!("{}/**/*", glob::Pattern::escape(&root.to_string_lossy()));
    let paths = glob::glob(&walk)
        .map_err(|e| BenchError::invalid_input(format!("cannot walk {}: {}", root.display(), e)))?;

    let mut found = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let context = format!("listing {}", e.path().display());
            BenchError::io(context, e.into_error())
        })?;
        if path.is_file() && regex.is_match(&path.to_string_lossy()) {
            found.push(path);
        }
    }

    found.sort();
    found.dedup();
    log::debug!("{} files under {} match {:?}", found.len(), root.display(), pattern);
    Ok(found)
}

/// Longest common leading string of all paths, character by character.
pub fn common_prefix(paths: &[PathBuf]) -> String {
    let mut iter = paths.iter().map(|p| p.to_string_lossy());
    let first = match iter.next() {
        Some(f) => f.into_owned(),
        None => return String::new(),
    };
    let mut len = first.len();
    for other in iter {
        len = first
            .char_indices()
            .zip(other.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, c), _)| i + c.len_utf8())
            .min(len);
    }
    first[..len].to_owned()
}

/// Output location for `input`: `prefix` stripped, made relative, placed under
/// `out_dir`, extension replaced by `.png`.
pub fn output_path(out_dir: &Path, input: &Path, prefix: &str) -> PathBuf {
    let text = input.to_string_lossy();
    let stripped = text.strip_prefix(prefix).unwrap_or(&text);
    let mut relative: PathBuf = Path::new(stripped)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    if relative.as_os_str().is_empty() {
        // The prefix swallowed the whole path (single input file).
        relative = input.file_name().map(PathBuf::from).unwrap_or_default();
    }
    out_dir.join(relative).with_extension("png")
}
