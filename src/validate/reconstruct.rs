use std::collections::BTreeMap;

use crate::error::{BenchError, Result};
use crate::shape::GridShape;
use crate::validate::cell_key::CellKey;

/// Inclusive row/column extent of one component.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_row: u64,
    max_row: u64,
    min_col: u64,
    max_col: u64,
}

impl Bounds {
    fn new(key: &CellKey) -> Bounds {
        Bounds { min_row: key.row, max_row: key.row, min_col: key.col, max_col: key.col }
    }

    fn include(&mut self, key: &CellKey) {
        self.min_row = self.min_row.min(key.row);
        self.max_row = self.max_row.max(key.row);
        self.min_col = self.min_col.min(key.col);
        self.max_col = self.max_col.max(key.col);
    }

    fn shape(&self, component: u64) -> Result<GridShape> {
        let rows = span(self.min_row, self.max_row);
        let cols = span(self.min_col, self.max_col);
        match (rows, cols) {
            (Some(rows), Some(cols)) => Ok(GridShape::new(rows, cols)),
            _ => Err(BenchError::invalid_input(format!(
                "component {} spans more cells than a shape can hold",
                component
            ))),
        }
    }
}

/// Cell count of the inclusive range `min..=max`.
fn span(min: u64, max: u64) -> Option<u64> {
    max.checked_sub(min)?.checked_add(1)
}

/// Groups cell keys by component and returns each component's bounding-box
/// shape, oriented (smaller dimension first).
///
/// Spans come from the extreme coordinates, so missing interior cells do not
/// shrink a component. Any malformed key fails the whole batch, as does a
/// component whose span overflows `u64`.
pub fn reconstruct<I, S>(keys: I) -> Result<BTreeMap<u64, GridShape>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let cells = keys
        .into_iter()
        .map(|k| CellKey::parse(k.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let mut bounds: BTreeMap<u64, Bounds> = BTreeMap::new();
    for cell in &cells {
        bounds
            .entry(cell.component)
            .and_modify(|b| b.include(cell))
            .or_insert_with(|| Bounds::new(cell));
    }

    bounds
        .into_iter()
        .map(|(id, b)| Ok((id, b.shape(id)?.oriented())))
        .collect()
}
