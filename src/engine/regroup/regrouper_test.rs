use super::regrouper::{group_key, regroup};
use super::rule_set::{PrefixRule, RuleSet};
use crate::engine::key::ArtifactKey;
use crate::test_helpers::factory::Factory;

fn gamjet_rules() -> RuleSet {
    RuleSet::default().with_channel(
        "GamJet",
        vec![
            PrefixRule::new("QCDHT", "QCD"),
            PrefixRule::new("GJetsHT", "GJets"),
        ],
    )
}

fn key(raw: &str) -> ArtifactKey {
    ArtifactKey::parse(raw).unwrap()
}

#[test]
fn binned_mc_collapses_to_process_family() {
    let rules = gamjet_rules();
    assert_eq!(regroup(&key("MC_GamJet_2018_QCDHT100To200"), &rules), "QCD");
    assert_eq!(regroup(&key("MC_GamJet_2018_QCDHT2000ToInf"), &rules), "QCD");
    assert_eq!(regroup(&key("MC_GamJet_2018_GJetsHT40To100"), &rules), "GJets");
}

#[test]
fn unmatched_sample_passes_through() {
    let rules = gamjet_rules();
    assert_eq!(
        regroup(&key("MC_GamJet_2018_DYJetsToLLM50"), &rules),
        "DYJetsToLLM50"
    );
}

#[test]
fn rules_are_channel_scoped() {
    let rules = gamjet_rules();
    assert_eq!(
        regroup(&key("MC_ZeeJet_2018_QCDHT100To200"), &rules),
        "QCDHT100To200"
    );
}

#[test]
fn first_matching_rule_wins() {
    let rules = RuleSet::default().with_channel(
        "MultiJet",
        vec![
            PrefixRule::new("QCDHT", "QCD"),
            PrefixRule::new("QCD", "Other"),
        ],
    );
    assert_eq!(regroup(&key("MC_MultiJet_2017_QCDHT300To500"), &rules), "QCD");
    assert_eq!(regroup(&key("MC_MultiJet_2017_QCDPt15"), &rules), "Other");
}

#[test]
fn data_groups_by_dataset_segment() {
    let rules = gamjet_rules().with_channel("ZeeJet", vec![PrefixRule::new("Double", "X")]);
    assert_eq!(regroup(&key("Data_ZeeJet_2017B_DoubleEG"), &rules), "DoubleEG");
    assert_eq!(regroup(&key("Data_GamJet_2018A_EGamma"), &rules), "EGamma");
}

#[test]
fn data_segment_position_is_configurable() {
    let rules = RuleSet::default().with_data_segment(1);
    assert_eq!(regroup(&key("Data_ZeeJet_2017B_DoubleEG"), &rules), "ZeeJet");

    let out_of_range = RuleSet::default().with_data_segment(9);
    assert_eq!(
        regroup(&key("Data_ZeeJet_2017B_DoubleEG"), &out_of_range),
        "DoubleEG"
    );
}

#[test]
fn regroup_is_deterministic() {
    let rules = gamjet_rules();
    let k = key("MC_GamJet_2016Pre_GJetsHT200To400");
    let first = regroup(&k, &rules);
    for _ in 0..10 {
        assert_eq!(regroup(&k, &rules), first);
    }
}

#[test]
fn group_key_replaces_era_and_sample() {
    let rules = gamjet_rules();
    let grouped = group_key(&key("MC_GamJet_2018_QCDHT100To200"), &rules, "2018");
    assert_eq!(grouped.to_string(), "MC_GamJet_2018_QCD");

    let data = group_key(&key("Data_GamJet_2018C_EGamma"), &rules, "2018");
    assert_eq!(data.to_string(), "Data_GamJet_2018_EGamma");
}

#[test]
fn group_key_targets_the_year() {
    let era_key = Factory::artifact_key()
        .with("channel", "GamJet")
        .with("era", "2018")
        .with("sample", "QCDHT700To1000")
        .create();
    let grouped = group_key(&era_key, &gamjet_rules(), "2018");
    assert_eq!(grouped.to_string(), "MC_GamJet_2018_QCD");

    let data_key = Factory::artifact_key()
        .with("category", "Data")
        .with("channel", "GamJet")
        .with("era", "2018A")
        .with("sample", "EGamma")
        .create();
    let grouped = group_key(&data_key, &gamjet_rules(), "2018");
    assert_eq!(grouped.to_string(), "Data_GamJet_2018_EGamma");
}
