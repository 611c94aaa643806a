//! Log level definitions and the atomic level threshold

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    /// All levels in ascending severity order
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /// Upper-case label used by the console handler
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Lower-case name written to the `level` key of JSON records
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Convert from the `repr` value stored in an [`AtomicLevel`]
    ///
    /// Out-of-range values saturate to `Fatal`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Fatal,
        }
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Trace => BrightBlack,
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Level threshold that can be read and replaced from any thread
///
/// Loads and stores are single atomic operations, so checking a level never
/// takes a lock or allocates.
///
/// # Example
///
/// ```
/// use rust_event_logger::{AtomicLevel, LogLevel};
///
/// let threshold = AtomicLevel::new(LogLevel::Info);
/// assert!(!threshold.is_enabled(LogLevel::Debug));
///
/// threshold.store(LogLevel::Debug);
/// assert!(threshold.is_enabled(LogLevel::Debug));
/// ```
#[derive(Debug)]
pub struct AtomicLevel(AtomicU8);

impl AtomicLevel {
    pub const fn new(level: LogLevel) -> Self {
        Self(AtomicU8::new(level as u8))
    }

    #[inline]
    pub fn load(&self) -> LogLevel {
        LogLevel::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, level: LogLevel) {
        self.0.store(level as u8, Ordering::Release);
    }

    /// Whether a call at `level` passes the threshold
    ///
    /// `Fatal` is always enabled.
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level == LogLevel::Fatal || level as u8 >= self.0.load(Ordering::Acquire)
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(LogLevel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Info.as_str(), "info");
        assert_eq!(LogLevel::Info.to_str(), "INFO");
        assert_eq!(LogLevel::Warn.to_string(), "WARN");
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(" Error ".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_u8_roundtrip() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_u8(level as u8), level);
        }
        assert_eq!(LogLevel::from_u8(200), LogLevel::Fatal);
    }

    #[test]
    fn test_atomic_level_gating() {
        let threshold = AtomicLevel::new(LogLevel::Warn);

        assert!(!threshold.is_enabled(LogLevel::Trace));
        assert!(!threshold.is_enabled(LogLevel::Info));
        assert!(threshold.is_enabled(LogLevel::Warn));
        assert!(threshold.is_enabled(LogLevel::Error));

        threshold.store(LogLevel::Trace);
        assert_eq!(threshold.load(), LogLevel::Trace);
        assert!(threshold.is_enabled(LogLevel::Trace));
    }

    #[test]
    fn test_fatal_always_enabled() {
        let threshold = AtomicLevel::new(LogLevel::Fatal);
        assert!(threshold.is_enabled(LogLevel::Fatal));
        assert!(!threshold.is_enabled(LogLevel::Error));
    }

    #[test]
    fn test_atomic_level_visible_across_threads() {
        let threshold = std::sync::Arc::new(AtomicLevel::new(LogLevel::Info));
        let remote = std::sync::Arc::clone(&threshold);

        std::thread::spawn(move || remote.store(LogLevel::Error))
            .join()
            .unwrap();

        assert_eq!(threshold.load(), LogLevel::Error);
        assert!(!threshold.is_enabled(LogLevel::Warn));
    }
}
