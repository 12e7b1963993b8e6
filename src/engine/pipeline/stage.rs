use crate::engine::errors::KeyError;
use crate::engine::key::ArtifactKey;
use crate::engine::manifest::Manifest;
use crate::engine::merge::{AggregationLevel, GroupMap};
use crate::engine::regroup::{RuleSet, group_key};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use tracing::warn;

/// One aggregation step. Each consumes the manifests of its source level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Job outputs of one key into a single file per key.
    JobsToEra,
    /// Eras (and binned samples) of one year into process/dataset groups.
    EraToYear,
    /// All years of a channel into the run period.
    YearToRunPeriod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedKey {
    pub key: String,
    pub error: KeyError,
}

/// Pure result of planning a stage over its input manifests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StagePlan {
    pub groups: GroupMap,
    pub rejected: Vec<RejectedKey>,
}

impl StagePlan {
    pub fn member_count(&self) -> usize {
        self.groups.values().map(|m| m.len()).sum()
    }
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::JobsToEra, Stage::EraToYear, Stage::YearToRunPeriod];

    pub fn source(&self) -> AggregationLevel {
        match self {
            Stage::JobsToEra => AggregationLevel::Jobs,
            Stage::EraToYear => AggregationLevel::Era,
            Stage::YearToRunPeriod => AggregationLevel::Year,
        }
    }

    pub fn target(&self) -> AggregationLevel {
        match self {
            Stage::JobsToEra => AggregationLevel::Era,
            Stage::EraToYear => AggregationLevel::Year,
            Stage::YearToRunPeriod => AggregationLevel::RunPeriod,
        }
    }

    /// Group identity of one input key at this stage's target level.
    /// `scope` is the year for the lower stages and the run period at the top.
    pub fn group_for(&self, key: &ArtifactKey, rules: &RuleSet, scope: &str) -> ArtifactKey {
        match self {
            Stage::JobsToEra => key.clone(),
            Stage::EraToYear => group_key(key, rules, scope),
            // Samples were regrouped at the year level already.
            Stage::YearToRunPeriod => key.with_era(scope),
        }
    }

    /// Builds merge groups from `inputs` in discovery order: manifests in the
    /// given order, keys in manifest order. Unparseable keys are dropped and
    /// reported, never fatal.
    pub fn plan(&self, inputs: &[Manifest], rules: &RuleSet, scope: &str) -> StagePlan {
        let mut plan = StagePlan::default();

        for manifest in inputs {
            for (raw_key, value) in manifest {
                let key = match ArtifactKey::parse(raw_key) {
                    Ok(key) => key,
                    Err(error) => {
                        warn!(target: "pipeline::stage", stage = %self, key = %raw_key, %error, "Dropping artifact with invalid key");
                        plan.rejected.push(RejectedKey {
                            key: raw_key.clone(),
                            error,
                        });
                        continue;
                    }
                };

                let group_id = self.group_for(&key, rules, scope).to_string();
                plan.groups
                    .entry(group_id)
                    .or_default()
                    .extend(value.paths().into_iter().map(PathBuf::from));
            }
        }

        plan
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::JobsToEra => f.write_str("merge-jobs"),
            Stage::EraToYear => f.write_str("merge-eras"),
            Stage::YearToRunPeriod => f.write_str("merge-years"),
        }
    }
}
