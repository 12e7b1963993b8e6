use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error};

/// Errors raised while parsing an artifact key string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Malformed key '{key}': expected 4 '_'-separated segments, found {segments}")]
    Malformed { key: String, segments: usize },

    #[error("Unknown category '{category}' in key '{key}' (expected MC or Data)")]
    UnknownCategory { key: String, category: String },
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure of a single combiner invocation. Never fatal to a run.
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("Failed to spawn combiner '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Combiner exited with {status}: {stderr_tail}")]
    ExitStatus { status: String, stderr_tail: String },

    #[error("Combiner timed out after {0}s")]
    TimedOut(u64),

    #[error("Run cancelled before the group was merged")]
    Cancelled,

    #[error("I/O error while finalizing merged output: {0}")]
    Io(#[from] io::Error),

    #[error("Combiner task aborted: {0}")]
    Join(String),
}

/// Run-fatal aggregation errors. Raised before any combiner is invoked.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Output path collision at {path}: groups '{first}' and '{second}' derive the same file")]
    OutputCollision {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("Output layout error: {0}")]
    Layout(String),
}

impl AggregateError {
    pub fn log_error(&self) {
        match self {
            AggregateError::OutputCollision {
                path,
                first,
                second,
            } => {
                error!(%first, %second, "Output path collision, refusing to merge");
                debug!("Colliding output path: {}", path.display());
            }
            AggregateError::Layout(e) => {
                error!("Output layout error: {}", e);
                debug!("Output layout error details: {}", e);
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to spawn extractor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Extractor exited with {status} for {path}: {stderr_tail}")]
    ExitStatus {
        path: PathBuf,
        status: String,
        stderr_tail: String,
    },

    #[error("Extractor output for {path} is not a number: '{output}'")]
    Unparsable { path: PathBuf, output: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Aggregation error: {0}")]
    Aggregate(#[from] AggregateError),
}

impl PipelineError {
    pub fn log_error(&self) {
        match self {
            PipelineError::Manifest(e) => {
                error!("Manifest error: {}", e);
                debug!("Manifest error details: {:?}", e);
            }
            PipelineError::Aggregate(e) => e.log_error(),
        }
    }
}
