//! The sample manifest records which images were drawn, so an evaluation set
//! can be rebuilt later.

use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};
use crate::sample::item::SampleItem;
use crate::shape::GridShape;
use crate::table::{read_table, write_table};

const COLUMNS: [&str; 4] = ["fn", "regex", "type", "shape"];

pub fn write_manifest<'a, I>(path: &Path, items: I) -> Result<()>
where
    I: IntoIterator<Item = &'a SampleItem>,
{
    let header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    let rows = items.into_iter().map(|item| {
        vec![
            item.path.to_string_lossy().into_owned(),
            item.pattern.clone(),
            item.kind.clone(),
            GridShape::format_list(&item.expected_shape),
        ]
    });
    write_table(path, &header, rows)
}

pub fn read_manifest(path: &Path) -> Result<Vec<SampleItem>> {
    let table = read_table(path)?;
    let [fn_col, regex_col, type_col, shape_col] = [
        table.column(COLUMNS[0])?,
        table.column(COLUMNS[1])?,
        table.column(COLUMNS[2])?,
        table.column(COLUMNS[3])?,
    ];

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let shape = GridShape::parse_list(table.cell(row, i, shape_col)?)
                .map_err(|e| BenchError::invalid_input(format!("Row {}: {}", i + 1, e)))?;
            Ok(SampleItem {
                path: PathBuf::from(table.cell(row, i, fn_col)?),
                pattern: table.cell(row, i, regex_col)?.to_owned(),
                kind: table.cell(row, i, type_col)?.to_owned(),
                expected_shape: shape,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv.gz");
        let items = vec![
            SampleItem {
                path: PathBuf::from("dst/a,b.tif"),
                pattern: ".*a.*".into(),
                kind: "A".into(),
                expected_shape: vec![GridShape::new(2, 3), GridShape::new(1, 4)],
            },
            SampleItem {
                path: PathBuf::from("dst/c.tif"),
                pattern: ".*c.*".into(),
                kind: "C".into(),
                expected_shape: vec![GridShape::new(8, 12)],
            },
        ];
        write_manifest(&path, &items).unwrap();
        assert_eq!(read_manifest(&path).unwrap(), items);
    }

    #[test]
    fn manifest_without_shape_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        std::fs::write(&path, "fn,regex,type\na,b,c\n").unwrap();
        assert!(read_manifest(&path).is_err());
    }
}
