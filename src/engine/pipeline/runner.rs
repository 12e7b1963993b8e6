use super::stage::Stage;
use crate::engine::errors::PipelineError;
use crate::engine::manifest::{Manifest, ManifestStore, ManifestValue};
use crate::engine::merge::aggregator::ensure_distinct_outputs;
use crate::engine::merge::{MergeAggregator, MergePlan, OutputLayout, RunState, RunSummary};
use crate::engine::regroup::RuleSet;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything a stage run needs, passed explicitly rather than read from globals.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub hist_dir: PathBuf,
    pub manifest_dir: PathBuf,
    pub channels: Vec<String>,
    pub years: Vec<String>,
    pub run_period: String,
    pub file_template: String,
    pub rules: RuleSet,
}

/// Merge work for one (channel, scope) combination of a stage.
#[derive(Debug)]
struct StageUnit {
    channel: String,
    scope: String,
    plans: Vec<MergePlan>,
    manifest_path: PathBuf,
}

/// I/O boundary around the pure stages: reads source manifests, runs the
/// aggregator, and writes one output manifest per unit.
pub struct PipelineRunner {
    config: PipelineConfig,
    store: ManifestStore,
    aggregator: MergeAggregator,
    run_state: RunState,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig, aggregator: MergeAggregator, run_state: RunState) -> Self {
        let store = ManifestStore::new(config.manifest_dir.clone());
        Self {
            config,
            store,
            aggregator: aggregator.with_run_state(run_state.clone()),
            run_state,
        }
    }

    /// Runs `stages` in order; each consumes the manifests the previous one wrote.
    pub async fn run_all(&self, stages: &[Stage]) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();
        for stage in stages {
            if self.run_state.is_cancelled() {
                warn!(target: "pipeline::runner", stage = %stage, "Run cancelled, not starting stage");
                break;
            }
            self.run_stage(*stage, &mut summary).await?;
        }
        Ok(summary)
    }

    /// Plans every unit of `stage` first, so a collision or unreadable
    /// manifest stops the run before anything is merged or written.
    pub async fn run_stage(
        &self,
        stage: Stage,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        info!(target: "pipeline::runner", stage = %stage, from = %stage.source(), to = %stage.target(), "Planning stage");

        let units = self.plan_stage(stage, summary)?;
        if let Err(e) = ensure_distinct_outputs(units.iter().flat_map(|u| u.plans.iter())) {
            e.log_error();
            return Err(e.into());
        }

        for unit in units {
            if self.run_state.is_cancelled() {
                warn!(
                    target: "pipeline::runner",
                    stage = %stage,
                    channel = %unit.channel,
                    scope = %unit.scope,
                    "Run cancelled, leaving previous manifest untouched"
                );
                break;
            }

            info!(
                target: "pipeline::runner",
                stage = %stage,
                channel = %unit.channel,
                scope = %unit.scope,
                groups = unit.plans.len(),
                "Processing unit"
            );
            let report = self.aggregator.execute(unit.plans).await;
            summary.absorb(stage.target(), &report);

            if self.run_state.is_cancelled() {
                warn!(target: "pipeline::runner", channel = %unit.channel, scope = %unit.scope, "Run cancelled mid-unit, manifest not written");
                break;
            }

            let manifest: Manifest = report
                .merged
                .iter()
                .map(|(group_id, path)| (group_id.clone(), ManifestValue::from(path.clone())))
                .collect();
            manifest.write(&unit.manifest_path)?;
        }

        Ok(())
    }

    fn plan_stage(
        &self,
        stage: Stage,
        summary: &mut RunSummary,
    ) -> Result<Vec<StageUnit>, PipelineError> {
        let mut units = Vec::new();

        for channel in &self.config.channels {
            match stage {
                Stage::JobsToEra | Stage::EraToYear => {
                    for year in &self.config.years {
                        let source = self.store.path_for(stage.source(), channel, year);
                        let Some(manifest) = Manifest::read_optional(&source)? else {
                            summary.manifests_missing += 1;
                            continue;
                        };
                        units.push(self.plan_unit(stage, channel, year, &[manifest], summary)?);
                    }
                }
                Stage::YearToRunPeriod => {
                    let mut inputs = Vec::new();
                    for year in &self.config.years {
                        let source = self.store.path_for(stage.source(), channel, year);
                        match Manifest::read_optional(&source)? {
                            Some(manifest) => inputs.push(manifest),
                            None => summary.manifests_missing += 1,
                        }
                    }
                    if inputs.is_empty() {
                        warn!(target: "pipeline::runner", %channel, "No yearly manifests for channel, skipping");
                        continue;
                    }
                    let run_period = self.config.run_period.clone();
                    units.push(self.plan_unit(stage, channel, &run_period, &inputs, summary)?);
                }
            }
        }

        Ok(units)
    }

    fn plan_unit(
        &self,
        stage: Stage,
        channel: &str,
        scope: &str,
        inputs: &[Manifest],
        summary: &mut RunSummary,
    ) -> Result<StageUnit, PipelineError> {
        let plan = stage.plan(inputs, &self.config.rules, scope);
        summary.rejected_keys += plan.rejected.len();

        let target = stage.target();
        let mut dir = self.config.hist_dir.join(channel);
        if let Some(level_dir) = target.dir_name() {
            dir = dir.join(level_dir);
        }
        let layout = OutputLayout::new(dir.join(scope)).with_template(&self.config.file_template);
        let plans = MergeAggregator::plan(&plan.groups, &layout, target)?;

        Ok(StageUnit {
            channel: channel.to_string(),
            scope: scope.to_string(),
            plans,
            manifest_path: self.store.path_for(target, channel, scope),
        })
    }
}
