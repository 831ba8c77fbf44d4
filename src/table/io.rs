//! Table files on disk. Paths ending in `.gz` are gzip-compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{BenchError, Result};
use crate::table::csv::{format_row, parse_table, Table};

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |e| e.eq_ignore_ascii_case("gz"))
}

/// Reads and parses a table file, decompressing `.gz` transparently.
pub fn read_table(path: &Path) -> Result<Table> {
    let ctx = || format!("reading {}", path.display());
    let file = File::open(path).map_err(|e| BenchError::io(ctx(), e))?;

    let mut bytes = Vec::new();
    if is_gzip(path) {
        GzDecoder::new(BufReader::new(file))
            .read_to_end(&mut bytes)
            .map_err(|e| BenchError::io(ctx(), e))?;
    } else {
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .map_err(|e| BenchError::io(ctx(), e))?;
    }
    parse_table(&bytes)
}

/// Writes `header` followed by `rows`, compressing when the path ends in `.gz`.
pub fn write_table<I>(path: &Path, header: &[String], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let ctx = || format!("writing {}", path.display());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BenchError::io(ctx(), e))?;
    }
    let file = File::create(path).map_err(|e| BenchError::io(ctx(), e))?;

    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        write_rows(&mut encoder, header, rows).map_err(|e| BenchError::io(ctx(), e))?;
        encoder
            .finish()
            .and_then(|mut w| w.flush())
            .map_err(|e| BenchError::io(ctx(), e))
    } else {
        let mut writer = BufWriter::new(file);
        write_rows(&mut writer, header, rows).map_err(|e| BenchError::io(ctx(), e))?;
        writer.flush().map_err(|e| BenchError::io(ctx(), e))
    }
}

fn write_rows<W, I>(out: &mut W, header: &[String], rows: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    writeln!(out, "{}", format_row(header))?;
    for row in rows {
        writeln!(out, "{}", format_row(&row))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["fn".into(), "type".into()]
    }

    #[test]
    fn gzip_table_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv.gz");
        write_table(&path, &header(), vec![vec!["a.png".into(), "A".into()]]).unwrap();

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[0x1f, 0x8b]);

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, header());
        assert_eq!(table.rows, vec![vec!["a.png".to_string(), "A".to_string()]]);
    }

    #[test]
    fn plain_table_is_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&path, &header(), Vec::new()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fn,type\n");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_table(Path::new("/nonexistent/rules.csv")).unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }
}
