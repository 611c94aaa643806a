//! Logger metrics for observability
//!
//! Counters are relaxed atomics shared by a logger and every logger derived
//! from it, so updating them never takes a lock or allocates.

use super::error::LoggerError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_event_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written();
/// metrics.record_write_failure();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.write_failures(), 1);
/// assert_eq!(metrics.failure_rate(), 50.0);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records handed to the sink successfully
    records_written: AtomicU64,

    /// Records the handler failed to write (sink error or handler panic)
    write_failures: AtomicU64,

    /// Fields omitted because of an invalid key or a failed render
    fields_rejected: AtomicU64,

    /// Values clamped to the string limit
    values_truncated: AtomicU64,

    /// Records that hit the size ceiling and lost fields
    records_truncated: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            records_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            fields_rejected: AtomicU64::new(0),
            values_truncated: AtomicU64::new(0),
            records_truncated: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fields_rejected(&self) -> u64 {
        self.fields_rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn values_truncated(&self) -> u64 {
        self.values_truncated.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_truncated(&self) -> u64 {
        self.records_truncated.load(Ordering::Relaxed)
    }

    /// Record a successfully written record
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a failed write
    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Count an error under the matching counter
    pub fn record_error(&self, err: &LoggerError) {
        let counter = match err {
            LoggerError::InvalidKey { .. } | LoggerError::Render { .. } => &self.fields_rejected,
            LoggerError::ValueTruncated { .. } => &self.values_truncated,
            LoggerError::RecordTooLarge { .. } => &self.records_truncated,
            LoggerError::SinkWrite { .. }
            | LoggerError::IoError(_)
            | LoggerError::HandlerPanicked { .. } => &self.write_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Failed writes as a percentage of all write attempts (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written yet.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.records_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.records_written.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.fields_rejected.store(0, Ordering::Relaxed);
        self.values_truncated.store(0, Ordering::Relaxed);
        self.records_truncated.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            records_written: AtomicU64::new(self.records_written()),
            write_failures: AtomicU64::new(self.write_failures()),
            fields_rejected: AtomicU64::new(self.fields_rejected()),
            values_truncated: AtomicU64::new(self.values_truncated()),
            records_truncated: AtomicU64::new(self.records_truncated()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::KeyError;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.records_written(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.fields_rejected(), 0);
        assert_eq!(metrics.values_truncated(), 0);
        assert_eq!(metrics.records_truncated(), 0);
    }

    #[test]
    fn test_record_written_returns_previous() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_written(), 0);
        assert_eq!(metrics.record_written(), 1);
        assert_eq!(metrics.records_written(), 2);
    }

    #[test]
    fn test_errors_land_in_matching_counter() {
        let metrics = LoggerMetrics::new();
        metrics.record_error(&LoggerError::invalid_key(KeyError::Empty, 0));
        metrics.record_error(&LoggerError::render("v"));
        metrics.record_error(&LoggerError::value_truncated(10));
        metrics.record_error(&LoggerError::record_too_large(256));
        metrics.record_error(&LoggerError::handler_panicked("json"));

        assert_eq!(metrics.fields_rejected(), 2);
        assert_eq!(metrics.values_truncated(), 1);
        assert_eq!(metrics.records_truncated(), 1);
        assert_eq!(metrics.write_failures(), 1);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..100 {
            metrics.record_written();
        }
        for _ in 0..10 {
            metrics.record_write_failure();
        }
        let rate = metrics.failure_rate();
        assert!(rate > 9.0 && rate < 10.0, "Failure rate was {}", rate);
    }

    #[test]
    fn test_reset_and_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_written();
        let snapshot = metrics.clone();

        metrics.reset();
        assert_eq!(metrics.records_written(), 0);
        assert_eq!(snapshot.records_written(), 1);
    }
}
