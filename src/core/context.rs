//! Per-run configuration handed to every scanner

use crate::core::cancel::CancelFlag;
use crate::core::profile::ScanPlan;
use crate::core::rate_limit::RateLimiter;
use crate::core::sink::{SharedSink, SilentSink, TracingSink};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

pub const DEFAULT_DELAY_SECS: f64 = 0.5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct ScanOptions {
    pub verbose: bool,
    pub delay: Duration,
    pub timeout: Duration,
    pub cancel: CancelFlag,
    pub sink: SharedSink,
}

impl ScanOptions {
    pub fn new(verbose: bool, delay_secs: f64) -> Self {
        Self {
            verbose,
            delay: clamp_delay(delay_secs),
            ..Self::default()
        }
    }

    /// Options that emit nothing, for quiet runs and tests.
    pub fn silent(delay: Duration) -> Self {
        Self {
            delay,
            sink: Arc::new(SilentSink),
            ..Self::default()
        }
    }

    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn info(&self, message: &str) {
        self.sink.emit(Level::INFO, message);
    }

    pub fn warn(&self, message: &str) {
        self.sink.emit(Level::WARN, message);
    }

    /// Only emitted when `verbose` is set.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.sink.emit(Level::DEBUG, message);
        }
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            delay: clamp_delay(DEFAULT_DELAY_SECS),
            timeout: DEFAULT_TIMEOUT,
            cancel: CancelFlag::new(),
            sink: Arc::new(TracingSink),
        }
    }
}

impl fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanOptions")
            .field("verbose", &self.verbose)
            .field("delay", &self.delay)
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

fn clamp_delay(secs: f64) -> Duration {
    RateLimiter::from_secs_f64(secs).interval()
}

/// One target together with the concrete scans to run against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanJob {
    pub target: String,
    pub plan: ScanPlan,
}

impl ScanJob {
    pub fn new(target: impl Into<String>, plan: ScanPlan) -> Self {
        Self {
            target: target.into(),
            plan,
        }
    }
}
