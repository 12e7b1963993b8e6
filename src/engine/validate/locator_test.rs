use super::locator::LevelLocator;
use crate::engine::merge::AggregationLevel;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "1").unwrap();
}

#[test]
fn resolves_artifacts_at_every_level() {
    let dir = tempdir().unwrap();
    let ch = dir.path().join("GamJet");
    touch(&ch.join("2017/MC_GamJet_2017_QCDHT100To200_Hist_1of2.root"));
    touch(&ch.join("2017/MC_GamJet_2017_QCDHT100To200_Hist_2of2.root"));
    touch(&ch.join("2017/MC_GamJet_2017_GJetsHT40To100_Hist_1of1.root"));
    touch(&ch.join("2018/MC_GamJet_2018_QCDHT100To200_Hist_1of1.root"));
    touch(&ch.join("MergedJobs/2017/MC_GamJet_2017_QCDHT100To200_Hist_Merged.root"));
    touch(&ch.join("MergedEras/2017/MC_GamJet_2017_QCD_Hist_Merged.root"));
    touch(&ch.join("MergedYears/Run2/MC_GamJet_Run2_QCD_Hist_Merged.root"));

    let locator = LevelLocator::new(
        dir.path(),
        "GamJet",
        vec!["2017".into(), "2018".into()],
        "Run2",
    );
    let found = locator.resolve("QCD");

    assert_eq!(
        found.keys().copied().collect::<Vec<_>>(),
        AggregationLevel::ALL.to_vec()
    );
    assert_eq!(found[&AggregationLevel::Jobs].len(), 3);
    assert_eq!(found[&AggregationLevel::Era].len(), 1);
    assert_eq!(found[&AggregationLevel::Year].len(), 1);
    assert_eq!(found[&AggregationLevel::RunPeriod].len(), 1);
}

#[test]
fn skips_hidden_partial_outputs_and_missing_dirs() {
    let dir = tempdir().unwrap();
    let ch = dir.path().join("ZeeJet");
    touch(&ch.join("MergedJobs/2017/.MC_ZeeJet_2017_DY_Merged.root.partial.root"));
    touch(&ch.join("MergedJobs/2017/MC_ZeeJet_2017_DY_Merged.root"));

    let locator = LevelLocator::new(dir.path(), "ZeeJet", vec!["2017".into()], "Run2");
    let found = locator.resolve("DY");

    assert!(found[&AggregationLevel::Jobs].is_empty());
    assert_eq!(
        found[&AggregationLevel::Era],
        vec![ch.join("MergedJobs/2017/MC_ZeeJet_2017_DY_Merged.root")]
    );
    assert!(found[&AggregationLevel::RunPeriod].is_empty());
}

#[test]
fn patterns_use_level_directories() {
    let locator = LevelLocator::new("/hist", "GamJet", vec!["2016Pre".into()], "Run2");
    assert_eq!(locator.channel(), "GamJet");
    let patterns = locator.patterns("QCD");
    assert_eq!(
        patterns[&AggregationLevel::Jobs],
        vec!["/hist/GamJet/2016Pre/*QCD*".to_string()]
    );
    assert_eq!(
        patterns[&AggregationLevel::Year],
        vec!["/hist/GamJet/MergedEras/2016Pre/*QCD*".to_string()]
    );
    assert_eq!(
        patterns[&AggregationLevel::RunPeriod],
        vec!["/hist/GamJet/MergedYears/Run2/*QCD*".to_string()]
    );
}
