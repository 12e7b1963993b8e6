use crate::engine::errors::ExtractError;
use crate::engine::merge::combiner::stderr_tail;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Result of looking up a scalar in an artifact. `NotFound` is kept apart
/// from a zero value so an absent histogram never passes as an empty one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Found(f64),
    NotFound,
}

impl Statistic {
    pub fn value(&self) -> Option<f64> {
        match self {
            Statistic::Found(v) => Some(*v),
            Statistic::NotFound => None,
        }
    }
}

pub trait StatisticExtractor: Send + Sync {
    fn extract(&self, path: &Path, locator: &str) -> Result<Statistic, ExtractError>;
}

/// Delegates to an external reader, e.g. a small ROOT macro printing a
/// histogram integral. Exit 0 prints the number on its last stdout line;
/// `not_found_exit_code` means the object is absent.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    not_found_exit_code: i32,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>, not_found_exit_code: i32) -> Self {
        Self {
            program: program.into(),
            args,
            not_found_exit_code,
        }
    }

    fn render_args(&self, path: &Path, locator: &str) -> Vec<String> {
        let path = path.to_string_lossy();
        self.args
            .iter()
            .map(|a| a.replace("{path}", &path).replace("{locator}", locator))
            .collect()
    }
}

impl StatisticExtractor for CommandExtractor {
    fn extract(&self, path: &Path, locator: &str) -> Result<Statistic, ExtractError> {
        let output = Command::new(&self.program)
            .args(self.render_args(path, locator))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExtractError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.code() == Some(self.not_found_exit_code) {
            debug!(target: "statistic::extract", path = %path.display(), locator, "Object not found");
            return Ok(Statistic::NotFound);
        }
        if !output.status.success() {
            return Err(ExtractError::ExitStatus {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr_tail: stderr_tail(&output.stderr),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let last = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .unwrap_or("");
        last.parse::<f64>()
            .map(Statistic::Found)
            .map_err(|_| ExtractError::Unparsable {
                path: path.to_path_buf(),
                output: last.to_string(),
            })
    }
}
