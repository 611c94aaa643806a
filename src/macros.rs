//! Logging macros for formatted messages
//!
//! These macros are shorthand for `logger.<level>().msgf(format_args!(...))`.
//! The arguments are only formatted when the level is enabled, and then
//! directly into the record buffer.
//!
//! # Examples
//!
//! ```
//! use rust_event_logger::{info, Logger, MemorySink};
//!
//! let sink = MemorySink::new();
//! let logger = Logger::json(sink.clone());
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! assert_eq!(
//!     sink.lines(),
//!     vec![r#"{"level":"info","message":"Server listening on port 8080"}"#]
//! );
//! ```

/// Log a formatted message at the given level.
///
/// # Examples
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::json(MemorySink::new());
/// use rust_event_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level).msgf(::std::format_args!($($arg)+))
    };
}

/// Log a trace-level message.
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::json(MemorySink::new());
/// use rust_event_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::json(MemorySink::new());
/// use rust_event_logger::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message and exit the process.
///
/// ```no_run
/// # use rust_event_logger::prelude::*;
/// # let logger = Logger::json(std::io::stderr());
/// use rust_event_logger::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
