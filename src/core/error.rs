//! Error types for the event logger
//!
//! None of these errors ever reach the call site of a log statement. They are
//! forwarded to the logger's [`ErrorCallback`], or printed to stderr when no
//! callback is installed.

use std::fmt;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, LoggerError>;

/// Callback invoked for every validation or sink failure
///
/// The callback runs on the thread that issued the log call, after the
/// offending field was dropped or clamped.
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

/// Why a field key was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Key is empty or whitespace only
    Empty,
    /// Key exceeds the configured maximum length
    TooLong,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Empty => write!(f, "empty after trimming"),
            KeyError::TooLong => write!(f, "too long"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Field key failed validation; the field was omitted
    #[error("Invalid field key ({reason}, {len} bytes): field omitted")]
    InvalidKey { reason: KeyError, len: usize },

    /// Value exceeded the limit and was clamped; the field was still written
    #[error("Field value exceeds {limit} bytes: truncated")]
    ValueTruncated { limit: usize },

    /// Record reached the size ceiling; trailing fields were dropped
    #[error("Record exceeds {limit} bytes: remaining fields dropped")]
    RecordTooLarge { limit: usize },

    /// A value could not be rendered (its `Display` impl panicked or failed)
    #[error("Rendering of field '{key}' failed: field omitted")]
    Render { key: String },

    /// Sink write failure with the handler that issued it
    #[error("Write to {handler} sink failed: {source}")]
    SinkWrite {
        handler: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Handler panicked while writing a record
    #[error("Handler '{handler}' panicked while writing a record")]
    HandlerPanicked { handler: String },
}

impl LoggerError {
    /// Create an invalid key error
    pub fn invalid_key(reason: KeyError, len: usize) -> Self {
        LoggerError::InvalidKey { reason, len }
    }

    /// Create a value truncation error
    pub fn value_truncated(limit: usize) -> Self {
        LoggerError::ValueTruncated { limit }
    }

    /// Create a record ceiling error
    pub fn record_too_large(limit: usize) -> Self {
        LoggerError::RecordTooLarge { limit }
    }

    /// Create a render failure error
    pub fn render(key: impl Into<String>) -> Self {
        LoggerError::Render { key: key.into() }
    }

    /// Create a sink write error
    pub fn sink_write(handler: &'static str, source: std::io::Error) -> Self {
        LoggerError::SinkWrite { handler, source }
    }

    /// Create a handler panic error
    pub fn handler_panicked(handler: impl Into<String>) -> Self {
        LoggerError::HandlerPanicked {
            handler: handler.into(),
        }
    }

    /// Whether the error was raised while validating a field, as opposed to
    /// writing the finished record
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LoggerError::InvalidKey { .. }
                | LoggerError::ValueTruncated { .. }
                | LoggerError::RecordTooLarge { .. }
                | LoggerError::Render { .. }
        )
    }
}

/// Forward an error to the callback, or to stderr when none is installed
pub(crate) fn report(callback: Option<&ErrorCallback>, err: &LoggerError) {
    match callback {
        Some(callback) => callback(err),
        None => eprintln!("[LOGGER ERROR] {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::invalid_key(KeyError::TooLong, 300);
        assert!(matches!(err, LoggerError::InvalidKey { .. }));

        let err = LoggerError::value_truncated(65_536);
        assert!(matches!(err, LoggerError::ValueTruncated { .. }));

        let err = LoggerError::record_too_large(1024);
        assert!(matches!(err, LoggerError::RecordTooLarge { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::invalid_key(KeyError::Empty, 0);
        assert_eq!(
            err.to_string(),
            "Invalid field key (empty after trimming, 0 bytes): field omitted"
        );

        let err = LoggerError::value_truncated(65_536);
        assert_eq!(err.to_string(), "Field value exceeds 65536 bytes: truncated");

        let err = LoggerError::render("payload");
        assert_eq!(
            err.to_string(),
            "Rendering of field 'payload' failed: field omitted"
        );

        let err = LoggerError::handler_panicked("json");
        assert_eq!(
            err.to_string(),
            "Handler 'json' panicked while writing a record"
        );
    }

    #[test]
    fn test_sink_write_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = LoggerError::sink_write("json", io_err);

        assert!(matches!(err, LoggerError::SinkWrite { .. }));
        assert!(err.to_string().contains("json"));
        assert!(err.to_string().contains("pipe closed"));
        assert!(!err.is_validation());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_report_uses_callback() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        let callback: ErrorCallback = Arc::new(move |err: &LoggerError| {
            assert!(err.is_validation());
            hits_clone.fetch_add(1, Ordering::Relaxed);
        });

        report(Some(&callback), &LoggerError::record_too_large(10));
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }
}
