use crate::engine::errors::AggregateError;
use crate::engine::key::ArtifactKey;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILE_TEMPLATE: &str = "{group}_Merged.root";

const KEY_PLACEHOLDERS: [&str; 4] = ["{category}", "{channel}", "{era}", "{sample}"];

/// Derives the output path of a merge group: `dir` joined with the rendered
/// file template. Placeholders: `{group}`, `{category}`, `{channel}`,
/// `{era}`, `{sample}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
    file_template: String,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_template: DEFAULT_FILE_TEMPLATE.to_string(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.file_template = template.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn output_path(&self, group_id: &str) -> Result<PathBuf, AggregateError> {
        let mut name = self.file_template.replace("{group}", group_id);

        if KEY_PLACEHOLDERS.iter().any(|p| name.contains(p)) {
            let key = ArtifactKey::parse(group_id).map_err(|e| {
                AggregateError::Layout(format!(
                    "template '{}' needs key fields but group '{}' is not a key: {}",
                    self.file_template, group_id, e
                ))
            })?;
            name = name
                .replace("{category}", key.category.as_str())
                .replace("{channel}", &key.channel)
                .replace("{era}", &key.era)
                .replace("{sample}", &key.sample);
        }

        if name.is_empty() || name.contains('/') {
            return Err(AggregateError::Layout(format!(
                "template '{}' renders an invalid file name '{}' for group '{}'",
                self.file_template, name, group_id
            )));
        }

        Ok(self.dir.join(name))
    }
}
