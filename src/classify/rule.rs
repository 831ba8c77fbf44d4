use std::path::Path;

use regex::Regex;

use crate::error::{BenchError, Result};
use crate::shape::GridShape;
use crate::table::{read_table, Table};

/// One row of the rule table: paths matching `pattern` are of type `kind`
/// and should contain grid components of `expected_shape`.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub pattern: String,
    pub kind: String,
    pub expected_shape: Vec<GridShape>,
    regex: Regex,
}

impl ClassificationRule {
    /// Compiles `pattern` anchored at the start of the path; the match may
    /// end anywhere.
    pub fn new(pattern: &str, kind: &str, expected_shape: Vec<GridShape>) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|e| BenchError::regex(pattern, e))?;
        Ok(ClassificationRule {
            pattern: pattern.to_owned(),
            kind: kind.to_owned(),
            expected_shape,
            regex,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Ordered, immutable set of classification rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<ClassificationRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<ClassificationRule>) -> RuleTable {
        RuleTable { rules }
    }

    /// Builds rules from a table with `regex`, `type` and `shape` columns.
    pub fn from_table(table: &Table) -> Result<RuleTable> {
        let regex_col = table.column("regex")?;
        let type_col = table.column("type")?;
        let shape_col = table.column("shape")?;

        let rules = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let pattern = table.cell(row, i, regex_col)?;
                let kind = table.cell(row, i, type_col)?;
                let shape = GridShape::parse_list(table.cell(row, i, shape_col)?).map_err(|e| {
                    BenchError::invalid_input(format!("Row {}: {}", i + 1, e))
                })?;
                ClassificationRule::new(pattern, kind.trim(), shape)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RuleTable { rules })
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn get(&self, index: usize) -> Option<&ClassificationRule> {
        self.rules.get(index)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Loads the rule table file (optionally `.gz`).
pub fn load_rules(path: &Path) -> Result<RuleTable> {
    let table = read_table(path)?;
    let rules = RuleTable::from_table(&table)?;
    log::info!("loaded {} classification rules from {}", rules.len(), path.display());
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    #[test]
    fn rule_matches_from_path_start() {
        let rule = ClassificationRule::new("dst/plates/.*", "plate", vec![]).unwrap();
        assert!(rule.matches("dst/plates/a.tif"));
        assert!(!rule.matches("old/dst/plates/a.tif"));
    }

    #[test]
    fn alternation_stays_anchored() {
        let rule = ClassificationRule::new("a|b", "ab", vec![]).unwrap();
        assert!(rule.matches("b/x"));
        assert!(!rule.matches("xb"));
    }

    #[test]
    fn table_columns_are_found_by_name() {
        let table = parse_table(b"type,shape,regex,note\nA,2-3@1-1,.*a.*,x\n").unwrap();
        let rules = RuleTable::from_table(&table).unwrap();
        assert_eq!(rules.len(), 1);
        let rule = rules.get(0).unwrap();
        assert_eq!(rule.kind, "A");
        assert_eq!(rule.pattern, ".*a.*");
        assert_eq!(rule.expected_shape, vec![GridShape::new(2, 3), GridShape::new(1, 1)]);
    }

    #[test]
    fn bad_shape_names_the_row() {
        let table = parse_table(b"regex,type,shape\n.*,A,2-3\n.*,B,2x3\n").unwrap();
        let err = RuleTable::from_table(&table).unwrap_err();
        assert!(err.to_string().contains("Row 2"));
    }

    #[test]
    fn bad_pattern_is_invalid_regex() {
        let table = parse_table(b"regex,type,shape\n(unclosed,A,1-1\n").unwrap();
        assert!(matches!(
            RuleTable::from_table(&table),
            Err(BenchError::InvalidRegex { .. })
        ));
    }
}
