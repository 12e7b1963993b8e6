use crate::engine::errors::ManifestError;
use crate::engine::manifest::{Manifest, ManifestStore, ManifestValue};
use crate::engine::merge::AggregationLevel;
use crate::engine::validate::{Statistic, StatisticExtractor};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Why a job output needs to be resubmitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Unfinished {
    Missing,
    TooSmall(u64),
    NoCutflow,
    Unreadable(String),
}

impl fmt::Display for Unfinished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unfinished::Missing => write!(f, "missing"),
            Unfinished::TooSmall(size) => write!(f, "too small ({} bytes)", size),
            Unfinished::NoCutflow => write!(f, "cutflow histogram not found"),
            Unfinished::Unreadable(e) => write!(f, "unreadable: {}", e),
        }
    }
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub checked: usize,
    pub unfinished: IndexMap<String, Vec<(PathBuf, Unfinished)>>,
}

impl CheckReport {
    pub fn unfinished_count(&self) -> usize {
        self.unfinished.values().map(Vec::len).sum()
    }

    /// Resubmission manifest: key -> unfinished job outputs.
    pub fn to_manifest(&self) -> Manifest {
        self.unfinished
            .iter()
            .map(|(key, outputs)| {
                let paths: Vec<String> = outputs
                    .iter()
                    .map(|(p, _)| p.to_string_lossy().into_owned())
                    .collect();
                (key.clone(), ManifestValue::from(paths))
            })
            .collect()
    }
}

/// Finds job outputs that did not finish before they are merged.
pub struct JobChecker {
    min_size_bytes: u64,
    cutflow_locator: Option<String>,
    extractor: Option<Arc<dyn StatisticExtractor>>,
}

impl JobChecker {
    pub fn new(min_size_bytes: u64) -> Self {
        Self {
            min_size_bytes,
            cutflow_locator: None,
            extractor: None,
        }
    }

    /// Also require `locator` to be readable in every output.
    pub fn with_cutflow(
        mut self,
        locator: impl Into<String>,
        extractor: Arc<dyn StatisticExtractor>,
    ) -> Self {
        self.cutflow_locator = Some(locator.into());
        self.extractor = Some(extractor);
        self
    }

    pub fn check(&self, manifest: &Manifest) -> CheckReport {
        let entries: Vec<(&String, PathBuf)> = manifest
            .iter()
            .flat_map(|(key, value)| {
                value
                    .paths()
                    .into_iter()
                    .map(move |p| (key, PathBuf::from(p)))
            })
            .collect();

        let verdicts: Vec<Option<Unfinished>> = entries
            .par_iter()
            .map(|(_, path)| self.inspect(path))
            .collect();

        let mut report = CheckReport {
            checked: entries.len(),
            ..Default::default()
        };
        for ((key, path), verdict) in entries.into_iter().zip(verdicts) {
            if let Some(reason) = verdict {
                warn!(target: "job_checker::check", %key, path = %path.display(), %reason, "Unfinished job output");
                report
                    .unfinished
                    .entry(key.clone())
                    .or_default()
                    .push((path, reason));
            }
        }
        report
    }

    /// Checks the job manifest of (`channel`, `year`) and writes its
    /// resubmission list. `None` when there is no job manifest.
    pub fn run(
        &self,
        store: &ManifestStore,
        channel: &str,
        year: &str,
    ) -> Result<Option<CheckReport>, ManifestError> {
        let source = store.path_for(AggregationLevel::Jobs, channel, year);
        let Some(manifest) = Manifest::read_optional(&source)? else {
            return Ok(None);
        };

        let report = self.check(&manifest);
        report.to_manifest().write(&store.resubmit_path(channel, year))?;
        info!(
            target: "job_checker::run",
            %channel,
            %year,
            checked = report.checked,
            unfinished = report.unfinished_count(),
            "Job outputs checked"
        );
        Ok(Some(report))
    }

    fn inspect(&self, path: &Path) -> Option<Unfinished> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(_) => return Some(Unfinished::Missing),
        };
        if size < self.min_size_bytes {
            return Some(Unfinished::TooSmall(size));
        }

        let (Some(locator), Some(extractor)) = (&self.cutflow_locator, &self.extractor) else {
            return None;
        };
        match extractor.extract(path, locator) {
            Ok(Statistic::Found(_)) => None,
            Ok(Statistic::NotFound) => Some(Unfinished::NoCutflow),
            Err(e) => Some(Unfinished::Unreadable(e.to_string())),
        }
    }
}
