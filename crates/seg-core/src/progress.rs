//! Progress observation for long simulation runs
//!
//! An optional observer interface; engines report completed rounds but never
//! depend on the sink for correctness.

use tracing::debug;

/// Observer notified as simulation rounds complete
pub trait ProgressSink {
    fn on_round(&mut self, completed: usize, total: usize);
}

/// Sink that ignores all progress reports
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_round(&mut self, _completed: usize, _total: usize) {}
}

/// Sink that logs every `every`-th round (and the last) at debug level
#[derive(Debug, Clone, Copy)]
pub struct TracingProgress {
    every: usize,
}

impl TracingProgress {
    pub fn new(every: usize) -> Self {
        assert!(every > 0, "reporting interval must be positive");
        Self { every }
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ProgressSink for TracingProgress {
    fn on_round(&mut self, completed: usize, total: usize) {
        if completed % self.every == 0 || completed == total {
            debug!(completed, total, "simulation progress");
        }
    }
}
