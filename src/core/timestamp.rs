//! Timestamp and duration formatting
//!
//! Built-in formats are written straight into any `fmt::Write` sink without
//! intermediate strings, so time fields keep the encoding path allocation
//! free. Only [`TimestampFormat::Custom`] goes through chrono's strftime
//! machinery.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_event_logger::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let instant = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// assert_eq!(TimestampFormat::Iso8601.format(&instant), "2025-01-08T10:30:45.000Z");
/// assert_eq!(TimestampFormat::Unix.format(&instant), "1736332245");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 with explicit offset: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    ///
    /// Unlike the built-in variants this may allocate while formatting.
    Custom(String),
}

impl TimestampFormat {
    /// Write `datetime` in this format
    ///
    /// Returns `Err` if the sink refuses more text or a custom format string
    /// is invalid.
    pub fn write_to<W: fmt::Write>(&self, w: &mut W, datetime: &DateTime<Utc>) -> fmt::Result {
        let nanos = datetime.nanosecond() % 1_000_000_000;
        match self {
            TimestampFormat::Iso8601 => {
                write_date_time(w, datetime)?;
                write!(w, ".{:03}Z", nanos / 1_000_000)
            }
            TimestampFormat::Iso8601Micros => {
                write_date_time(w, datetime)?;
                write!(w, ".{:06}Z", nanos / 1_000)
            }
            TimestampFormat::Rfc3339 => {
                write_date_time(w, datetime)?;
                write!(w, ".{:06}+00:00", nanos / 1_000)
            }
            TimestampFormat::Unix => write!(w, "{}", datetime.timestamp()),
            TimestampFormat::UnixMillis => write!(w, "{}", datetime.timestamp_millis()),
            TimestampFormat::UnixMicros => write!(w, "{}", datetime.timestamp_micros()),
            TimestampFormat::Custom(format_str) => write!(w, "{}", datetime.format(format_str)),
        }
    }

    /// Format a `DateTime<Utc>` into a new string
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        let mut out = String::new();
        let _ = self.write_to(&mut out, datetime);
        out
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}

fn write_date_time<W: fmt::Write>(w: &mut W, datetime: &DateTime<Utc>) -> fmt::Result {
    write!(
        w,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        datetime.year(),
        datetime.month(),
        datetime.day(),
        datetime.hour(),
        datetime.minute(),
        datetime.second()
    )
}

/// Convert a `SystemTime` to UTC without panicking on out-of-range values
pub fn system_time_to_utc(time: SystemTime) -> Option<DateTime<Utc>> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => {
            let secs = i64::try_from(since.as_secs()).ok()?;
            DateTime::from_timestamp(secs, since.subsec_nanos())
        }
        Err(before) => {
            let before = before.duration();
            let mut secs = -i64::try_from(before.as_secs()).ok()?;
            let mut nanos = before.subsec_nanos();
            if nanos > 0 {
                secs = secs.checked_sub(1)?;
                nanos = 1_000_000_000 - nanos;
            }
            DateTime::from_timestamp(secs, nanos)
        }
    }
}

/// Unit used when a duration is written to a JSON record
///
/// The console encoding always uses the human form (`1.5s`, `12.5ms`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationUnit {
    /// Fractional seconds: `1.5`
    Secs,
    /// Fractional milliseconds: `1500.0`
    #[default]
    Millis,
    /// Fractional microseconds: `1500000.0`
    Micros,
    /// Whole nanoseconds: `1500000000`
    Nanos,
}

impl DurationUnit {
    /// Write `duration` as a bare JSON number in this unit
    pub fn write_to<W: fmt::Write>(&self, w: &mut W, duration: Duration) -> fmt::Result {
        match self {
            DurationUnit::Secs => write!(w, "{:?}", duration.as_secs_f64()),
            DurationUnit::Millis => write!(w, "{:?}", duration.as_nanos() as f64 / 1e6),
            DurationUnit::Micros => write!(w, "{:?}", duration.as_nanos() as f64 / 1e3),
            DurationUnit::Nanos => write!(w, "{}", duration.as_nanos()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        let result = TimestampFormat::Iso8601.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_iso8601_micros_format() {
        let result = TimestampFormat::Iso8601Micros.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456Z");
    }

    #[test]
    fn test_rfc3339_format() {
        let result = TimestampFormat::Rfc3339.format(&fixed_datetime());
        assert_eq!(result, "2025-01-08T10:30:45.123456+00:00");
        assert!(DateTime::parse_from_rfc3339(&result).is_ok());
    }

    #[test]
    fn test_unix_formats() {
        let secs: i64 = TimestampFormat::Unix.format(&fixed_datetime()).parse().unwrap();
        let millis: i64 = TimestampFormat::UnixMillis
            .format(&fixed_datetime())
            .parse()
            .unwrap();
        let micros: i64 = TimestampFormat::UnixMicros
            .format(&fixed_datetime())
            .parse()
            .unwrap();

        assert_eq!(secs, 1_736_332_245);
        assert_eq!(millis, 1_736_332_245_123);
        assert_eq!(micros, 1_736_332_245_123_456);
    }

    #[test]
    fn test_custom_format() {
        let format = TimestampFormat::Custom("%Y/%m/%d %H:%M".to_string());
        assert_eq!(format.format(&fixed_datetime()), "2025/01/08 10:30");
    }

    #[test]
    fn test_is_numeric() {
        assert!(!TimestampFormat::Iso8601.is_numeric());
        assert!(!TimestampFormat::Rfc3339.is_numeric());
        assert!(TimestampFormat::Unix.is_numeric());
        assert!(TimestampFormat::UnixMillis.is_numeric());
        assert!(TimestampFormat::UnixMicros.is_numeric());
        assert!(!TimestampFormat::Custom("%s".to_string()).is_numeric());
    }

    #[test]
    fn test_system_time_conversion() {
        let epoch = system_time_to_utc(UNIX_EPOCH).unwrap();
        assert_eq!(epoch.timestamp(), 0);

        let before = UNIX_EPOCH - Duration::from_millis(1500);
        let converted = system_time_to_utc(before).unwrap();
        assert_eq!(converted.timestamp_millis(), -1500);
    }

    #[test]
    fn test_duration_units() {
        let duration = Duration::from_millis(1500);
        let render = |unit: DurationUnit| {
            let mut out = String::new();
            unit.write_to(&mut out, duration).unwrap();
            out
        };

        assert_eq!(render(DurationUnit::Secs), "1.5");
        assert_eq!(render(DurationUnit::Millis), "1500.0");
        assert_eq!(render(DurationUnit::Micros), "1500000.0");
        assert_eq!(render(DurationUnit::Nanos), "1500000000");
    }
}
