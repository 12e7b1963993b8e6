use super::artifact_key_factory::ArtifactKeyFactory;
use crate::engine::key::Category;

#[test]
fn creates_default_mc_key() {
    let key = ArtifactKeyFactory::new().create();
    assert_eq!(key.to_string(), "MC_ZeeJet_2017_DYJetsToLLM50");
}

#[test]
fn overrides_fields() {
    let key = ArtifactKeyFactory::new()
        .with("category", "Data")
        .with("era", "2017B")
        .with("sample", "DoubleEG")
        .create();
    assert_eq!(key.category, Category::Data);
    assert_eq!(key.to_string(), "Data_ZeeJet_2017B_DoubleEG");
}
