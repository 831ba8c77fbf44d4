use crate::error::{BenchError, Result};

/// One extracted cell: `<component>_<row>,<col>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub component: u64,
    pub row: u64,
    pub col: u64,
}

impl CellKey {
    /// Parses a key of the exact form `^(\d+)_(\d+),(\d+)$` (ASCII digits).
    ///
    /// A key outside the grammar is `MalformedCellKey`; a key inside it whose
    /// index does not fit in a `u64` is `InvalidInput`.
    pub fn parse(key: &str) -> Result<CellKey> {
        let malformed = || BenchError::MalformedCellKey { key: key.to_owned() };
        let (component, cell) = key.split_once('_').ok_or_else(malformed)?;
        let (row, col) = cell.split_once(',').ok_or_else(malformed)?;
        if ![component, row, col].iter().all(|s| is_index(s)) {
            return Err(malformed());
        }
        Ok(CellKey {
            component: parse_index(component, key)?,
            row: parse_index(row, key)?,
            col: parse_index(col, key)?,
        })
    }
}

fn is_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_index(s: &str, key: &str) -> Result<u64> {
    s.parse()
        .map_err(|_| BenchError::invalid_input(format!("cell key {:?}: index {} is out of range", key, s)))
}

impl std::str::FromStr for CellKey {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        CellKey::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_key() {
        assert_eq!(CellKey::parse("12_3,40").unwrap(), CellKey { component: 12, row: 3, col: 40 });
    }

    #[test]
    fn missing_column_is_malformed() {
        assert!(matches!(CellKey::parse("1_0"), Err(BenchError::MalformedCellKey { .. })));
    }

    #[test]
    fn rejects_everything_outside_the_grammar() {
        for key in ["", "1_0,", "_0,0", "a_0,0", "1_+2,3", "1_2,3 ", " 1_2,3", "1_2,3,4", "1-2,3", "1_2_3,4"] {
            assert!(CellKey::parse(key).is_err(), "{:?} should be rejected", key);
        }
    }

    #[test]
    fn accepts_indices_past_u32() {
        let key = CellKey::parse("5_4294967296,0").unwrap();
        assert_eq!(key.row, 4_294_967_296);
    }

    #[test]
    fn index_past_u64_is_out_of_range_not_malformed() {
        let err = CellKey::parse("1_18446744073709551616,0").unwrap_err();
        assert!(matches!(err, BenchError::InvalidInput { .. }));
    }
}
