use super::layout::OutputLayout;
use crate::engine::errors::AggregateError;
use std::path::PathBuf;

#[test]
fn default_template_appends_merged_suffix() {
    let layout = OutputLayout::new("/out");
    assert_eq!(
        layout.output_path("A").unwrap(),
        PathBuf::from("/out/A_Merged.root")
    );
}

#[test]
fn key_placeholders_render_from_group_key() {
    let layout = OutputLayout::new("/hist/GamJet/MergedEras/2018")
        .with_template("{category}-{sample}_{era}_Hist_Merged.root");
    assert_eq!(
        layout.output_path("MC_GamJet_2018_QCD").unwrap(),
        PathBuf::from("/hist/GamJet/MergedEras/2018/MC-QCD_2018_Hist_Merged.root")
    );
}

#[test]
fn key_placeholders_require_parseable_group() {
    let layout = OutputLayout::new("/out").with_template("{sample}.root");
    let err = layout.output_path("not-a-key").unwrap_err();
    assert!(matches!(err, AggregateError::Layout(_)));
}

#[test]
fn rejects_file_names_with_separators() {
    let layout = OutputLayout::new("/out").with_template("{group}.root");
    assert!(layout.output_path("a/b").is_err());
}
