pub mod regrouper;
pub mod rule_set;

pub use regrouper::{group_key, regroup};
pub use rule_set::{PrefixRule, RuleSet};

#[cfg(test)]
mod regrouper_test;
