use super::rule_set::RuleSet;
use crate::engine::key::ArtifactKey;

/// Merge-group sample name for `key`.
///
/// MC samples go through the channel's prefix rules (HT/pT bins collapse
/// into one process family). Data samples are grouped by the dataset found
/// at the rule set's fixed segment position, so several run-range eras of
/// the same trigger stream land in one group.
pub fn regroup(key: &ArtifactKey, rules: &RuleSet) -> String {
    if key.is_data() {
        return key
            .segment(rules.data_segment())
            .unwrap_or(key.sample.as_str())
            .to_string();
    }

    match rules.first_match(&key.channel, &key.sample) {
        Some(replacement) => replacement.to_string(),
        None => key.sample.clone(),
    }
}

/// Coarser key for `key` at `target_era`: the identity of the merge group it feeds.
pub fn group_key(key: &ArtifactKey, rules: &RuleSet, target_era: &str) -> ArtifactKey {
    ArtifactKey::new(
        key.category,
        key.channel.clone(),
        target_era,
        regroup(key, rules),
    )
}
