use crate::engine::merge::AggregationLevel;
use glob::Pattern;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Finds the artifacts of one sample at every aggregation level of the
/// histogram tree: `{hist}/{ch}/{year}` for jobs, `{hist}/{ch}/MergedJobs/{year}`,
/// `{hist}/{ch}/MergedEras/{year}` and `{hist}/{ch}/MergedYears/{run_period}`.
#[derive(Debug, Clone)]
pub struct LevelLocator {
    hist_dir: PathBuf,
    channel: String,
    years: Vec<String>,
    run_period: String,
}

impl LevelLocator {
    pub fn new(
        hist_dir: impl Into<PathBuf>,
        channel: impl Into<String>,
        years: Vec<String>,
        run_period: impl Into<String>,
    ) -> Self {
        Self {
            hist_dir: hist_dir.into(),
            channel: channel.into(),
            years,
            run_period: run_period.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Glob patterns per level. Every level is present, even when the
    /// configuration yields no pattern for it.
    pub fn patterns(&self, sample: &str) -> IndexMap<AggregationLevel, Vec<String>> {
        let base = self.hist_dir.join(&self.channel);
        let needle = format!("*{}*", Pattern::escape(sample));

        let mut patterns = IndexMap::new();
        for level in AggregationLevel::ALL {
            let scopes: Vec<&str> = match level {
                AggregationLevel::RunPeriod => vec![self.run_period.as_str()],
                _ => self.years.iter().map(String::as_str).collect(),
            };
            let level_patterns = scopes
                .into_iter()
                .map(|scope| {
                    let mut dir = base.clone();
                    if let Some(level_dir) = level.dir_name() {
                        dir = dir.join(level_dir);
                    }
                    let dir = Pattern::escape(&dir.join(scope).to_string_lossy());
                    format!("{}/{}", dir, needle)
                })
                .collect();
            patterns.insert(level, level_patterns);
        }
        patterns
    }

    /// Existing artifacts per level, sorted. Hidden files such as in-flight
    /// partial outputs are never counted.
    pub fn resolve(&self, sample: &str) -> IndexMap<AggregationLevel, Vec<PathBuf>> {
        self.patterns(sample)
            .into_iter()
            .map(|(level, patterns)| {
                let mut found: Vec<PathBuf> = patterns
                    .iter()
                    .flat_map(|pattern| expand(pattern))
                    .filter(|p| is_artifact(p))
                    .collect();
                found.sort();
                found.dedup();
                debug!(target: "level_locator::resolve", %level, sample, found = found.len(), "Resolved artifacts");
                (level, found)
            })
            .collect()
    }
}

fn expand(pattern: &str) -> Vec<PathBuf> {
    match glob::glob(pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(target: "level_locator::resolve", error = %e, "Unreadable path while globbing");
                    None
                }
            })
            .collect(),
        Err(e) => {
            warn!(target: "level_locator::resolve", %pattern, error = %e, "Invalid glob pattern");
            Vec::new()
        }
    }
}

fn is_artifact(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => !name.starts_with('.') && !name.ends_with(".tmp"),
        None => false,
    }
}
