pub mod locator;
pub mod statistic;
pub mod validator;

pub use locator::LevelLocator;
pub use statistic::{CommandExtractor, Statistic, StatisticExtractor};
pub use validator::{CountValidator, LevelTotal, ValidationResult, Verdict};

#[cfg(test)]
mod locator_test;
