use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run-wide cancellation flag shared between the driver and merge workers.
#[derive(Clone, Default, Debug)]
pub struct RunState {
    cancelled: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups not yet started are abandoned; in-flight merges finish.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
