use crate::engine::errors::CombineError;
use crate::engine::merge::Combiner;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-process combiner: the merged file holds the sum of the numbers stored
/// in its inputs, so event totals can be checked across levels without ROOT.
#[derive(Clone, Default)]
pub struct FakeCombiner {
    calls: Arc<Mutex<Vec<(PathBuf, Vec<PathBuf>)>>>,
    fail_when_output_contains: Option<String>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    write_outputs: bool,
}

impl FakeCombiner {
    pub fn new() -> Self {
        Self {
            write_outputs: true,
            ..Default::default()
        }
    }

    /// Only records calls; touches no files.
    pub fn recording_only() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_when_output_contains = Some(needle.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<PathBuf>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn merge(&self, output: &Path, inputs: &[PathBuf]) -> Result<(), CombineError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(needle) = &self.fail_when_output_contains {
            if output.to_string_lossy().contains(needle.as_str()) {
                return Err(CombineError::ExitStatus {
                    status: "exit status: 1".into(),
                    stderr_tail: format!("refusing to merge {}", output.display()),
                });
            }
        }

        if self.write_outputs {
            let mut total = 0.0f64;
            for input in inputs {
                let text = std::fs::read_to_string(input)?;
                total += text.trim().parse::<f64>().unwrap_or(0.0);
            }
            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(output, total.to_string())?;
        }
        Ok(())
    }
}

#[async_trait]
impl Combiner for FakeCombiner {
    async fn combine(&self, output: &Path, inputs: &[PathBuf]) -> Result<(), CombineError> {
        self.calls
            .lock()
            .unwrap()
            .push((output.to_path_buf(), inputs.to_vec()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let result = self.merge(output, inputs).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
