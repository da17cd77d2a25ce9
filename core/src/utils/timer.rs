//! Stage timing
//!
//! Pipeline stages wrap their work in a [`Timer`]; the elapsed time is logged
//! at a level chosen by the slow-stage threshold.

use std::time::{Duration, Instant};
use log::{debug, warn};

/// Timer for one pipeline stage
#[derive(Debug, Clone)]
pub struct Timer {
    /// Stage name
    name: String,

    /// Start time
    start: Instant,

    /// Elapsed time above which the stage is logged as slow
    slow_threshold: Option<Duration>,
}

impl Timer {
    /// Start a timer for the named stage
    pub fn new(name: impl Into<String>) -> Self {
        Timer {
            name: name.into(),
            start: Instant::now(),
            slow_threshold: None,
        }
    }

    /// Log at warn level when the stage runs longer than `threshold`
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    /// Time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since start in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Whether the slow threshold has been passed
    pub fn is_slow(&self) -> bool {
        self.slow_threshold
            .map(|threshold| self.elapsed() > threshold)
            .unwrap_or(false)
    }

    /// Log the elapsed time and return it
    pub fn finish(&self, message: impl AsRef<str>) -> Duration {
        let elapsed = self.elapsed();
        if self.is_slow() {
            warn!("{} {}: {:?} [SLOW]", self.name, message.as_ref(), elapsed);
        } else {
            debug!("{} {}: {:?}", self.name, message.as_ref(), elapsed);
        }
        elapsed
    }
}

/// Run a closure under a timer and log how long it took
pub fn time_stage<F, T>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let timer = Timer::new(name);
    let result = f();
    timer.finish("completed");
    result
}
