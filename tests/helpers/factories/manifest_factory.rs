use crate::engine::manifest::{Manifest, ManifestValue};
use std::path::Path;

pub struct ManifestFactory {
    manifest: Manifest,
}

impl ManifestFactory {
    pub fn new() -> Self {
        Self {
            manifest: Manifest::new(),
        }
    }

    pub fn with_path(mut self, key: &str, path: &str) -> Self {
        self.manifest.insert(key, path);
        self
    }

    pub fn with_paths<P: AsRef<Path>>(mut self, key: &str, paths: &[P]) -> Self {
        let paths: Vec<String> = paths
            .iter()
            .map(|p| p.as_ref().to_string_lossy().into_owned())
            .collect();
        self.manifest.insert(key, ManifestValue::Paths(paths));
        self
    }

    pub fn create(self) -> Manifest {
        self.manifest
    }
}
