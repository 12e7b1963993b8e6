use crate::engine::errors::ExtractError;
use crate::engine::validate::{Statistic, StatisticExtractor};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Table-driven extractor: unknown paths report `NotFound`.
#[derive(Clone, Default)]
pub struct FixedExtractor {
    values: HashMap<PathBuf, f64>,
}

impl FixedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, value: f64) -> Self {
        self.values.insert(path.into(), value);
        self
    }
}

impl StatisticExtractor for FixedExtractor {
    fn extract(&self, path: &Path, _locator: &str) -> Result<Statistic, ExtractError> {
        Ok(self
            .values
            .get(path)
            .map(|v| Statistic::Found(*v))
            .unwrap_or(Statistic::NotFound))
    }
}
