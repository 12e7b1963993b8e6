use crate::engine::errors::CombineError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Merges several histogram files into one. Treated as a black box: only
/// success or failure is observed.
#[async_trait]
pub trait Combiner: Send + Sync {
    async fn combine(&self, output: &Path, inputs: &[PathBuf]) -> Result<(), CombineError>;

    /// Called after an invocation was abandoned (timeout) so partial output
    /// can be removed.
    async fn abandon(&self, _output: &Path) {}
}

/// Runs an external merge tool (`hadd` by default) as
/// `{program} {args..} <partial> <inputs..>` and renames the partial file onto
/// `output` only once the tool exits successfully.
#[derive(Debug, Clone)]
pub struct HaddCombiner {
    program: String,
    args: Vec<String>,
}

impl Default for HaddCombiner {
    fn default() -> Self {
        Self {
            program: "hadd".to_string(),
            args: vec!["-f".to_string(), "-k".to_string()],
        }
    }
}

impl HaddCombiner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Hidden sibling that receives the tool's output until it is complete.
    /// Keeps the whole output name, so distinct outputs never share a partial.
    pub fn partial_path(output: &Path) -> PathBuf {
        let name = output
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        output.with_file_name(format!(".{}.partial.root", name))
    }
}

#[async_trait]
impl Combiner for HaddCombiner {
    async fn combine(&self, output: &Path, inputs: &[PathBuf]) -> Result<(), CombineError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = Self::partial_path(output);

        debug!(
            target: "hadd_combiner::combine",
            program = %self.program,
            output = %output.display(),
            inputs = inputs.len(),
            "Spawning combiner"
        );

        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(&partial)
            .args(inputs)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CombineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !result.status.success() {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(CombineError::ExitStatus {
                status: result.status.to_string(),
                stderr_tail: stderr_tail(&result.stderr),
            });
        }

        tokio::fs::rename(&partial, output).await?;
        Ok(())
    }

    async fn abandon(&self, output: &Path) {
        let partial = Self::partial_path(output);
        if let Err(e) = tokio::fs::remove_file(&partial).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(target: "hadd_combiner::abandon", path = %partial.display(), error = %e, "Failed to remove partial output");
            }
        }
    }
}

/// Last few non-empty stderr lines, joined for a one-line report.
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    const TAIL_LINES: usize = 3;
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join(" | ")
}
