use super::aggregator::AggregateReport;
use super::level::AggregationLevel;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub struct FailedGroup {
    pub level: AggregationLevel,
    pub group_id: String,
    pub error: String,
}

/// End-of-run totals across every stage and (channel, scope) unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub artifacts_processed: usize,
    pub groups_merged: usize,
    pub groups_failed: usize,
    pub groups_skipped: usize,
    pub rejected_keys: usize,
    pub manifests_missing: usize,
    pub failures: Vec<FailedGroup>,
}

impl RunSummary {
    pub fn absorb(&mut self, level: AggregationLevel, report: &AggregateReport) {
        self.artifacts_processed += report.inputs;
        self.groups_merged += report.merged.len();
        self.groups_failed += report.failed.len();
        self.groups_skipped += report.skipped.len();
        self.failures
            .extend(report.failed.iter().map(|f| FailedGroup {
                level,
                group_id: f.group_id.clone(),
                error: f.error.to_string(),
            }));
    }

    pub fn has_failures(&self) -> bool {
        self.groups_failed > 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.has_failures() { 1 } else { 0 }
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "==== Merge summary ====")?;
        writeln!(f, "{:25}: {}", "Artifacts processed", self.artifacts_processed)?;
        writeln!(f, "{:25}: {}", "Groups merged", self.groups_merged)?;
        writeln!(f, "{:25}: {}", "Groups failed", self.groups_failed)?;
        writeln!(f, "{:25}: {}", "Groups skipped (no input)", self.groups_skipped)?;
        writeln!(f, "{:25}: {}", "Rejected keys", self.rejected_keys)?;
        writeln!(f, "{:25}: {}", "Missing manifests", self.manifests_missing)?;
        if !self.failures.is_empty() {
            writeln!(f, "Failed groups:")?;
            for failure in &self.failures {
                writeln!(
                    f,
                    "  [{}] {}: {}",
                    failure.level, failure.group_id, failure.error
                )?;
            }
        }
        Ok(())
    }
}
