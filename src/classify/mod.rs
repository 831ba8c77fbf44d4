pub mod classifier;
pub mod rule;

pub use classifier::{classify, classify_all, Classification};
pub use rule::{load_rules, ClassificationRule, RuleTable};
