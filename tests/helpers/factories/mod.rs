pub mod artifact_key_factory;
pub mod fake_combiner;
pub mod fake_extractor;
pub mod manifest_factory;

pub use artifact_key_factory::ArtifactKeyFactory;
pub use fake_combiner::FakeCombiner;
pub use fake_extractor::FixedExtractor;
pub use manifest_factory::ManifestFactory;

#[cfg(test)]
mod artifact_key_factory_test;
#[cfg(test)]
mod fake_combiner_test;
