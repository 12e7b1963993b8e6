use std::fmt::{Display, Formatter};

/// Granularity of an artifact. Strictly ordered: Jobs < Era < Year < RunPeriod.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AggregationLevel {
    Jobs,
    Era,
    Year,
    RunPeriod,
}

impl AggregationLevel {
    pub const ALL: [AggregationLevel; 4] = [
        AggregationLevel::Jobs,
        AggregationLevel::Era,
        AggregationLevel::Year,
        AggregationLevel::RunPeriod,
    ];

    pub fn next(&self) -> Option<Self> {
        match self {
            AggregationLevel::Jobs => Some(AggregationLevel::Era),
            AggregationLevel::Era => Some(AggregationLevel::Year),
            AggregationLevel::Year => Some(AggregationLevel::RunPeriod),
            AggregationLevel::RunPeriod => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            AggregationLevel::Jobs => None,
            AggregationLevel::Era => Some(AggregationLevel::Jobs),
            AggregationLevel::Year => Some(AggregationLevel::Era),
            AggregationLevel::RunPeriod => Some(AggregationLevel::Year),
        }
    }

    /// Sub-directory (under `{hist_dir}/{channel}`) holding merged outputs of
    /// this level. Job outputs live directly in the per-year directory.
    pub fn dir_name(&self) -> Option<&'static str> {
        match self {
            AggregationLevel::Jobs => None,
            AggregationLevel::Era => Some("MergedJobs"),
            AggregationLevel::Year => Some("MergedEras"),
            AggregationLevel::RunPeriod => Some("MergedYears"),
        }
    }

    pub fn manifest_prefix(&self) -> &'static str {
        match self {
            AggregationLevel::Jobs => "FilesHist",
            AggregationLevel::Era => "FilesHistMergedJobs",
            AggregationLevel::Year => "FilesHistMergedEras",
            AggregationLevel::RunPeriod => "FilesHistMergedYears",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationLevel::Jobs => "Jobs",
            AggregationLevel::Era => "Era",
            AggregationLevel::Year => "Year",
            AggregationLevel::RunPeriod => "RunPeriod",
        }
    }
}

impl Display for AggregationLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
