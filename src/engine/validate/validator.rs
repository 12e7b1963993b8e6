use super::locator::LevelLocator;
use super::statistic::{Statistic, StatisticExtractor};
use crate::engine::merge::AggregationLevel;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The statistic could not be read somewhere, or the sample matched no
    /// artifact at any level. Totals are shown but not judged.
    Incomplete,
}

impl Verdict {
    /// Pass when every pair of totals agrees within `tolerance`, relative to
    /// the larger magnitude of the pair.
    pub fn evaluate(totals: &[f64], tolerance: f64) -> Verdict {
        for (i, a) in totals.iter().enumerate() {
            for b in &totals[i + 1..] {
                if !within_tolerance(*a, *b, tolerance) {
                    return Verdict::Fail;
                }
            }
        }
        Verdict::Pass
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
            Verdict::Incomplete => write!(f, "INCOMPLETE"),
        }
    }
}

pub fn within_tolerance(a: f64, b: f64, tolerance: f64) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        return true;
    }
    (a - b).abs() / scale <= tolerance
}

/// Summed statistic of one level. Artifacts that lack the object or fail to
/// read contribute nothing to `total` and are listed instead.
#[derive(Debug, Clone)]
pub struct LevelTotal {
    pub level: AggregationLevel,
    pub total: f64,
    pub artifacts: usize,
    pub not_found: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, String)>,
}

impl LevelTotal {
    pub fn empty(level: AggregationLevel) -> Self {
        Self {
            level,
            total: 0.0,
            artifacts: 0,
            not_found: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.not_found.is_empty() && self.errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub sample: String,
    pub levels: Vec<LevelTotal>,
    pub verdict: Verdict,
}

impl ValidationResult {
    pub fn total(&self, level: AggregationLevel) -> Option<f64> {
        self.levels.iter().find(|l| l.level == level).map(|l| l.total)
    }

    pub fn is_complete(&self) -> bool {
        self.levels.iter().all(LevelTotal::is_complete)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.sample, self.verdict)?;
        for level in &self.levels {
            write!(
                f,
                "  {:<10} total={:<16} artifacts={}",
                level.level.as_str(),
                level.total,
                level.artifacts
            )?;
            if !level.not_found.is_empty() {
                write!(f, " not_found={}", level.not_found.len())?;
            }
            if !level.errors.is_empty() {
                write!(f, " errors={}", level.errors.len())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Checks that a statistic is conserved across aggregation levels.
#[derive(Debug, Clone)]
pub struct CountValidator {
    locator: String,
    tolerance: f64,
}

impl CountValidator {
    pub fn new(locator: impl Into<String>, tolerance: f64) -> Self {
        Self {
            locator: locator.into(),
            tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sums the statistic per level. Levels absent from `level_paths` are
    /// reported with a zero total. A sample with no artifacts at all, or with
    /// any artifact lacking the statistic, is `Incomplete` rather than judged.
    pub fn validate(
        &self,
        sample: &str,
        level_paths: &IndexMap<AggregationLevel, Vec<PathBuf>>,
        extractor: &dyn StatisticExtractor,
    ) -> ValidationResult {
        let levels: Vec<LevelTotal> = AggregationLevel::ALL
            .iter()
            .map(|level| match level_paths.get(level) {
                Some(paths) => self.level_total(*level, paths, extractor),
                None => LevelTotal::empty(*level),
            })
            .collect();

        let totals: Vec<f64> = levels.iter().map(|l| l.total).collect();
        let nothing_matched = levels.iter().all(|l| l.artifacts == 0);
        let verdict = if nothing_matched || !levels.iter().all(LevelTotal::is_complete) {
            Verdict::Incomplete
        } else {
            Verdict::evaluate(&totals, self.tolerance)
        };

        for level in &levels {
            info!(
                target: "count_validator::validate",
                sample,
                level = %level.level,
                total = level.total,
                artifacts = level.artifacts,
                "Level total"
            );
        }
        match verdict {
            Verdict::Fail => {
                warn!(target: "count_validator::validate", sample, ?totals, tolerance = self.tolerance, "Counts differ between levels");
            }
            Verdict::Incomplete => {
                warn!(target: "count_validator::validate", sample, no_artifacts = nothing_matched, "Statistic missing, counts not compared");
            }
            Verdict::Pass => {}
        }

        ValidationResult {
            sample: sample.to_string(),
            levels,
            verdict,
        }
    }

    /// Resolves each sample through `locator` and validates them in parallel.
    pub fn validate_samples(
        &self,
        samples: &[String],
        locator: &LevelLocator,
        extractor: &dyn StatisticExtractor,
    ) -> Vec<ValidationResult> {
        samples
            .par_iter()
            .map(|sample| self.validate(sample, &locator.resolve(sample), extractor))
            .collect()
    }

    fn level_total(
        &self,
        level: AggregationLevel,
        paths: &[PathBuf],
        extractor: &dyn StatisticExtractor,
    ) -> LevelTotal {
        let outcomes: Vec<_> = paths
            .par_iter()
            .map(|path| (path, extractor.extract(path, &self.locator)))
            .collect();

        let mut total = LevelTotal::empty(level);
        total.artifacts = paths.len();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(Statistic::Found(v)) => total.total += v,
                Ok(Statistic::NotFound) => {
                    warn!(target: "count_validator::validate", %level, path = %path.display(), locator = %self.locator, "Statistic not found");
                    total.not_found.push(path.clone());
                }
                Err(e) => {
                    warn!(target: "count_validator::validate", %level, path = %path.display(), error = %e, "Statistic unreadable");
                    total.errors.push((path.clone(), e.to_string()));
                }
            }
        }
        total
    }
}
