use indexmap::IndexMap;
use serde::Deserialize;

/// Position of the trigger dataset inside a job-level Data key.
pub const DEFAULT_DATA_SEGMENT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrefixRule {
    pub prefix: String,
    pub replacement: String,
}

impl PrefixRule {
    pub fn new(prefix: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            replacement: replacement.into(),
        }
    }
}

/// Per-channel regrouping table. Rules are evaluated in insertion order
/// and the first matching prefix wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    channels: IndexMap<String, Vec<PrefixRule>>,
    data_segment: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            channels: IndexMap::new(),
            data_segment: DEFAULT_DATA_SEGMENT,
        }
    }
}

impl RuleSet {
    pub fn new(channels: IndexMap<String, Vec<PrefixRule>>) -> Self {
        Self {
            channels,
            data_segment: DEFAULT_DATA_SEGMENT,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>, rules: Vec<PrefixRule>) -> Self {
        self.channels.insert(channel.into(), rules);
        self
    }

    pub fn with_data_segment(mut self, segment: usize) -> Self {
        self.data_segment = segment;
        self
    }

    pub fn rules_for(&self, channel: &str) -> &[PrefixRule] {
        self.channels
            .get(channel)
            .map(|rules| rules.as_slice())
            .unwrap_or(&[])
    }

    #[inline]
    pub fn data_segment(&self) -> usize {
        self.data_segment
    }

    /// First replacement whose prefix matches `sample`, if any.
    pub fn first_match(&self, channel: &str, sample: &str) -> Option<&str> {
        self.rules_for(channel)
            .iter()
            .find(|rule| sample.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.replacement.as_str())
    }
}
