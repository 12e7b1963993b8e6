use crate::engine::errors::ManifestError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A manifest value: one merged artifact, a list of inputs, or a nested grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestValue {
    Path(String),
    Paths(Vec<String>),
    Nested(Manifest),
}

impl ManifestValue {
    /// Flattens the value into the artifact paths it references, in order.
    pub fn paths(&self) -> Vec<String> {
        match self {
            ManifestValue::Path(p) => vec![p.clone()],
            ManifestValue::Paths(ps) => ps.clone(),
            ManifestValue::Nested(m) => m.values().flat_map(|v| v.paths()).collect(),
        }
    }
}

impl From<&str> for ManifestValue {
    fn from(value: &str) -> Self {
        ManifestValue::Path(value.to_string())
    }
}

impl From<String> for ManifestValue {
    fn from(value: String) -> Self {
        ManifestValue::Path(value)
    }
}

impl From<PathBuf> for ManifestValue {
    fn from(value: PathBuf) -> Self {
        ManifestValue::Path(value.to_string_lossy().into_owned())
    }
}

impl From<Vec<String>> for ManifestValue {
    fn from(value: Vec<String>) -> Self {
        ManifestValue::Paths(value)
    }
}

impl From<Manifest> for ManifestValue {
    fn from(value: Manifest) -> Self {
        ManifestValue::Nested(value)
    }
}

/// Ordered mapping from a key string to a manifest value.
/// Key order is the insertion order and survives a write/read cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: IndexMap<String, ManifestValue>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ManifestValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ManifestValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &ManifestValue> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes to pretty JSON with write-then-rename, so a reader never
    /// observes a half-written manifest and a rerun supersedes the old one.
    pub fn write(&self, destination: &Path) -> Result<(), ManifestError> {
        let io_err = |source: std::io::Error| ManifestError::Io {
            path: destination.to_path_buf(),
            source,
        };

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut tmp_path = destination.to_path_buf();
        tmp_path.set_extension("json.tmp");

        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer, destination)?;
        writer.get_ref().sync_all().map_err(io_err)?;
        drop(writer);

        fs::rename(&tmp_path, destination).map_err(io_err)?;

        info!(target: "manifest::write", path = ?destination, entries = self.len(), "Wrote manifest");
        Ok(())
    }

    /// Pretty JSON (4-space indent, trailing newline) into `writer`. Any
    /// failure, including one raised while serializing, is an I/O error on `path`.
    pub(crate) fn write_to<W: Write>(&self, mut writer: W, path: &Path) -> Result<(), ManifestError> {
        let io_err = |source: std::io::Error| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };

        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
        self.serialize(&mut ser)
            .map_err(|e| io_err(std::io::Error::from(e)))?;
        writer.write_all(b"\n").map_err(io_err)?;
        writer.flush().map_err(io_err)
    }

    pub fn read(source: &Path) -> Result<Self, ManifestError> {
        let file = File::open(source).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ManifestError::NotFound(source.to_path_buf())
            } else {
                ManifestError::Io {
                    path: source.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let manifest: Manifest =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| ManifestError::Parse {
                path: source.to_path_buf(),
                source: e,
            })?;
        debug!(target: "manifest::read", path = ?source, entries = manifest.len(), "Read manifest");
        Ok(manifest)
    }

    /// Like [`Manifest::read`], but a missing manifest is an expected gap
    /// (a channel not run for some year) and yields `None`.
    pub fn read_optional(source: &Path) -> Result<Option<Self>, ManifestError> {
        match Self::read(source) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(ManifestError::NotFound(path)) => {
                warn!(target: "manifest::read", ?path, "Manifest not found, skipping");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl FromIterator<(String, ManifestValue)> for Manifest {
    fn from_iter<T: IntoIterator<Item = (String, ManifestValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = (&'a String, &'a ManifestValue);
    type IntoIter = indexmap::map::Iter<'a, String, ManifestValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
