use crate::engine::merge::level::AggregationLevel;
use std::path::PathBuf;

/// Names manifests on disk: `{prefix}_{channel}_{scope}.json`, where scope
/// is a year for the lower levels and the run period at the top.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Manifest holding the artifacts that exist at `level`.
    pub fn path_for(&self, level: AggregationLevel, channel: &str, scope: &str) -> PathBuf {
        self.dir.join(format!(
            "{}_{}_{}.json",
            level.manifest_prefix(),
            channel,
            scope
        ))
    }

    /// Resubmission list produced by the job completeness check.
    pub fn resubmit_path(&self, channel: &str, year: &str) -> PathBuf {
        self.dir
            .join(format!("ResubFilesHist_{}_{}.json", channel, year))
    }
}
