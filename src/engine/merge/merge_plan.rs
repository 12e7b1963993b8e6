use super::level::AggregationLevel;
use indexmap::IndexMap;
use std::path::PathBuf;

/// Group id -> member artifact paths, in discovery order. Duplicate members
/// are kept: each one is a separate job output feeding the group.
pub type GroupMap = IndexMap<String, Vec<PathBuf>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    /// Level the merged output belongs to
    pub level_to: AggregationLevel,
    /// Merge group identity (a coarser artifact key, or an opaque id)
    pub group_id: String,
    /// Input artifacts, fully resolved before the plan is executed
    pub inputs: Vec<PathBuf>,
    /// Destination of the merged artifact
    pub output: PathBuf,
}

impl MergePlan {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
