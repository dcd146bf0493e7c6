//! Run-scoped logging sink.
//!
//! Every stage of the pipeline receives a `&RunLog` explicitly. Messages are
//! forwarded to `tracing`; warnings, errors and successes are also counted so
//! the caller can derive an exit status once the run is over. Logging an error
//! never aborts anything by itself.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error, info, warn};

/// Counting log sink shared by all components of one run.
#[derive(Debug, Default)]
pub struct RunLog {
    warnings: AtomicUsize,
    errors: AtomicUsize,
    successes: AtomicUsize,
}

impl RunLog {
    /// Create a sink with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(&self, message: impl Display) {
        debug!("{}", message);
    }

    pub fn info(&self, message: impl Display) {
        info!("{}", message);
    }

    pub fn warning(&self, message: impl Display) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        warn!("{}", message);
    }

    /// Log an error and bump the error counter.
    pub fn error(&self, message: impl Display) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        error!("{}", message);
    }

    pub fn success(&self, message: impl Display) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        info!(outcome = "success", "{}", message);
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn success_count(&self) -> usize {
        self.successes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let log = RunLog::new();
        log.info("loading");
        log.debug("details");
        log.warning("first");
        log.warning("second");
        log.error("broken");
        log.success("done");

        assert_eq!(log.warning_count(), 2);
        assert_eq!(log.error_count(), 1);
        assert_eq!(log.success_count(), 1);
    }

    #[test]
    fn test_shared_across_threads() {
        let log = RunLog::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| log.error("worker failed"));
            }
        });
        assert_eq!(log.error_count(), 4);
    }
}
