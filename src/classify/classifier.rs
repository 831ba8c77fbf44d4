use std::path::PathBuf;

use crate::classify::rule::{ClassificationRule, RuleTable};
use crate::error::{BenchError, Result};
use crate::sample::SampleItem;

/// Outcome of matching one path against every rule.
#[derive(Debug, Clone)]
pub enum Classification<'a> {
    Unique(&'a ClassificationRule),
    /// Indices of every matching rule.
    Ambiguous(Vec<usize>),
    NoMatch,
}

impl RuleTable {
    /// Indices of every rule whose pattern matches `path`.
    pub fn matching(&self, path: &str) -> Vec<usize> {
        self.rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matches(path))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn classification(&self, path: &str) -> Classification<'_> {
        let matches = self.matching(path);
        match matches.len() {
            0 => Classification::NoMatch,
            1 => self.get(matches[0]).map_or(Classification::NoMatch, Classification::Unique),
            _ => Classification::Ambiguous(matches),
        }
    }
}

/// Returns the single rule matching `path`.
///
/// Zero or several matches are both `AmbiguousClassification`; rule order
/// never breaks a tie.
pub fn classify<'a>(path: &str, rules: &'a RuleTable) -> Result<&'a ClassificationRule> {
    let matches = match rules.classification(path) {
        Classification::Unique(rule) => return Ok(rule),
        Classification::Ambiguous(matches) => matches,
        Classification::NoMatch => Vec::new(),
    };
    Err(BenchError::AmbiguousClassification {
        path: path.to_owned(),
        matches,
    })
}

/// Classifies every path, splitting the listing into items and failures.
pub fn classify_all<I>(paths: I, rules: &RuleTable) -> (Vec<SampleItem>, Vec<BenchError>)
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut items = Vec::new();
    let mut failures = Vec::new();
    for path in paths {
        match classify(&path.to_string_lossy(), rules) {
            Ok(rule) => items.push(SampleItem::from_rule(path, rule)),
            Err(e) => {
                log::warn!("{}", e);
                failures.push(e);
            }
        }
    }
    (items, failures)
}
