use super::combiner::Combiner;
use super::layout::OutputLayout;
use super::level::AggregationLevel;
use super::merge_plan::{GroupMap, MergePlan};
use super::run_state::RunState;
use crate::engine::errors::{AggregateError, CombineError};
use futures::future::join_all;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Max combiner invocations in flight
    pub workers: usize,
    /// Upper bound for a single combiner invocation
    pub timeout: Option<Duration>,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            timeout: None,
        }
    }
}

#[derive(Debug)]
pub struct GroupFailure {
    pub group_id: String,
    pub output: PathBuf,
    pub error: CombineError,
}

/// Outcome of one aggregation pass. Only groups whose combiner completed
/// successfully appear in `merged`.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub merged: IndexMap<String, PathBuf>,
    pub failed: Vec<GroupFailure>,
    pub skipped: Vec<String>,
    pub inputs: usize,
}

impl AggregateReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn extend(&mut self, other: AggregateReport) {
        self.merged.extend(other.merged);
        self.failed.extend(other.failed);
        self.skipped.extend(other.skipped);
        self.inputs += other.inputs;
    }
}

pub struct MergeAggregator {
    combiner: Arc<dyn Combiner>,
    options: AggregatorOptions,
    run_state: RunState,
}

impl MergeAggregator {
    pub fn new(combiner: Arc<dyn Combiner>, options: AggregatorOptions) -> Self {
        Self {
            combiner,
            options,
            run_state: RunState::new(),
        }
    }

    pub fn with_run_state(mut self, run_state: RunState) -> Self {
        self.run_state = run_state;
        self
    }

    /// Turns groups into merge plans, one per group, in group order.
    /// Fails before anything is merged if two groups derive the same output.
    pub fn plan(
        groups: &GroupMap,
        layout: &OutputLayout,
        level_to: AggregationLevel,
    ) -> Result<Vec<MergePlan>, AggregateError> {
        let mut plans = Vec::with_capacity(groups.len());
        for (group_id, members) in groups {
            plans.push(MergePlan {
                level_to,
                group_id: group_id.clone(),
                inputs: members.clone(),
                output: layout.output_path(group_id)?,
            });
        }
        ensure_distinct_outputs(&plans)?;
        debug!(target: "merge_aggregator::plan", level = %level_to, plans = plans.len(), "Planned merge groups");
        Ok(plans)
    }

    /// Plans and executes `groups` under `layout`.
    pub async fn aggregate(
        &self,
        groups: &GroupMap,
        layout: &OutputLayout,
        level_to: AggregationLevel,
    ) -> Result<AggregateReport, AggregateError> {
        let plans = Self::plan(groups, layout, level_to)?;
        Ok(self.execute(plans).await)
    }

    /// Runs the combiner once per non-empty plan on a bounded pool. A failing
    /// group is recorded and never stops the others.
    pub async fn execute(&self, plans: Vec<MergePlan>) -> AggregateReport {
        let mut report = AggregateReport::default();
        let semaphore = Arc::new(Semaphore::new(self.options.workers.max(1)));
        let mut runnable = Vec::new();

        for plan in plans {
            if plan.is_empty() {
                warn!(
                    target: "merge_aggregator::run",
                    level = %plan.level_to,
                    group = %plan.group_id,
                    "No inputs for group, skipping"
                );
                report.skipped.push(plan.group_id);
                continue;
            }
            report.inputs += plan.inputs.len();
            runnable.push(plan);
        }

        info!(
            target: "merge_aggregator::run",
            groups = runnable.len(),
            skipped = report.skipped.len(),
            workers = self.options.workers.max(1),
            "Starting merge"
        );

        let handles: Vec<_> = runnable
            .iter()
            .map(|plan| {
                let plan = plan.clone();
                let semaphore = Arc::clone(&semaphore);
                let combiner = Arc::clone(&self.combiner);
                let run_state = self.run_state.clone();
                let timeout = self.options.timeout;
                tokio::spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(e) => return Err(CombineError::Join(e.to_string())),
                    };
                    if run_state.is_cancelled() {
                        return Err(CombineError::Cancelled);
                    }
                    run_one(combiner.as_ref(), &plan, timeout).await
                })
            })
            .collect();

        let outcomes = join_all(handles).await;

        for (plan, outcome) in runnable.into_iter().zip(outcomes) {
            let result = match outcome {
                Ok(result) => result,
                Err(join_err) => Err(CombineError::Join(join_err.to_string())),
            };
            match result {
                Ok(()) => {
                    report.merged.insert(plan.group_id, plan.output);
                }
                Err(e) => {
                    error!(
                        target: "merge_aggregator::run",
                        level = %plan.level_to,
                        group = %plan.group_id,
                        error = %e,
                        "Group merge failed"
                    );
                    report.failed.push(GroupFailure {
                        group_id: plan.group_id,
                        output: plan.output,
                        error: e,
                    });
                }
            }
        }

        info!(
            target: "merge_aggregator::run",
            merged = report.merged.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "Merge finished"
        );
        report
    }
}

async fn run_one(
    combiner: &dyn Combiner,
    plan: &MergePlan,
    timeout: Option<Duration>,
) -> Result<(), CombineError> {
    info!(
        target: "merge_aggregator::run",
        group = %plan.group_id,
        inputs = plan.inputs.len(),
        output = %plan.output.display(),
        "Merging group"
    );

    match timeout {
        None => combiner.combine(&plan.output, &plan.inputs).await,
        Some(limit) => {
            match tokio::time::timeout(limit, combiner.combine(&plan.output, &plan.inputs)).await {
                Ok(result) => result,
                Err(_) => {
                    combiner.abandon(&plan.output).await;
                    Err(CombineError::TimedOut(limit.as_secs()))
                }
            }
        }
    }
}

/// Output paths must be unique across every plan of a run.
pub fn ensure_distinct_outputs<'a, I>(plans: I) -> Result<(), AggregateError>
where
    I: IntoIterator<Item = &'a MergePlan>,
{
    let mut seen: HashMap<&PathBuf, &str> = HashMap::new();
    for plan in plans {
        if let Some(first) = seen.insert(&plan.output, &plan.group_id) {
            return Err(AggregateError::OutputCollision {
                path: plan.output.clone(),
                first: first.to_string(),
                second: plan.group_id.clone(),
            });
        }
    }
    Ok(())
}
