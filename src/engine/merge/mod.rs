pub mod aggregator;
pub mod combiner;
pub mod layout;
pub mod level;
pub mod merge_plan;
pub mod run_state;
pub mod summary;

pub use aggregator::{AggregateReport, AggregatorOptions, GroupFailure, MergeAggregator};
pub use combiner::{Combiner, HaddCombiner};
pub use layout::OutputLayout;
pub use level::AggregationLevel;
pub use merge_plan::{GroupMap, MergePlan};
pub use run_state::RunState;
pub use summary::RunSummary;

#[cfg(test)]
mod combiner_test;
#[cfg(test)]
mod layout_test;
