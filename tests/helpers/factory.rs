pub use super::factories::{ArtifactKeyFactory, ManifestFactory};

pub struct Factory;

impl Factory {
    pub fn artifact_key() -> ArtifactKeyFactory {
        ArtifactKeyFactory::new()
    }

    pub fn manifest() -> ManifestFactory {
        ManifestFactory::new()
    }
}
