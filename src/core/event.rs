//! Per-call event builder
//!
//! An [`Event`] is what `Logger::info()` and friends return. When the level is
//! enabled it owns a pooled buffer seeded with the logger's persistent fields;
//! each field method encodes straight into that buffer. A terminal method
//! (`msg`, `msgf`, `send`, `discard`) consumes the event, so a field can never
//! be added after the record has been handed off.
//!
//! When the level is disabled the event holds nothing and every method
//! returns immediately.

use super::{
    buffer::PooledBuffer,
    encoder::{self, EncoderConfig},
    error::{LoggerError, Result},
    handler::Record,
    log_level::LogLevel,
    logger::Logger,
};
use chrono::Utc;
use std::fmt;

/// Field methods shared by [`Event`] and `ContextBuilder`
///
/// The implementing type provides `fn field(self, encode) -> Self`.
macro_rules! field_methods {
    () => {
        /// Add a string field
        pub fn str(self, key: &str, value: &str) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_str(buf, config, key, value))
        }

        /// Add a byte string field, replacing invalid UTF-8 with U+FFFD
        pub fn str_lossy(self, key: &str, value: &[u8]) -> Self {
            self.field(|buf, config| {
                $crate::core::encoder::encode_str_lossy(buf, config, key, value)
            })
        }

        /// Add a list of strings
        pub fn strs<S: AsRef<str>>(self, key: &str, values: &[S]) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_strs(buf, config, key, values))
        }

        pub fn i64(self, key: &str, value: i64) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_i64(buf, config, key, value))
        }

        pub fn u64(self, key: &str, value: u64) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_u64(buf, config, key, value))
        }

        pub fn i32(self, key: &str, value: i32) -> Self {
            self.i64(key, i64::from(value))
        }

        pub fn u32(self, key: &str, value: u32) -> Self {
            self.u64(key, u64::from(value))
        }

        /// Add a float field; `NaN` and infinities are written as bare tokens
        pub fn f64(self, key: &str, value: f64) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_f64(buf, config, key, value))
        }

        pub fn f32(self, key: &str, value: f32) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_f32(buf, config, key, value))
        }

        pub fn bool(self, key: &str, value: bool) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_bool(buf, config, key, value))
        }

        pub fn duration(self, key: &str, value: ::std::time::Duration) -> Self {
            self.field(|buf, config| {
                $crate::core::encoder::encode_duration(buf, config, key, value)
            })
        }

        pub fn time(self, key: &str, value: &::chrono::DateTime<::chrono::Utc>) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_time(buf, config, key, value))
        }

        pub fn system_time(self, key: &str, value: ::std::time::SystemTime) -> Self {
            self.field(|buf, config| {
                $crate::core::encoder::encode_system_time(buf, config, key, value)
            })
        }

        /// Add bytes as a lower-case hex string
        pub fn hex(self, key: &str, value: &[u8]) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_hex(buf, config, key, value))
        }

        /// Add an error and its source chain under the `error` key
        pub fn err(self, err: &(dyn ::std::error::Error + 'static)) -> Self {
            self.field(|buf, config| $crate::core::encoder::encode_err(buf, config, err))
        }

        /// Add any `Display` value as text
        pub fn display(self, key: &str, value: &dyn ::std::fmt::Display) -> Self {
            self.field(|buf, config| {
                $crate::core::encoder::encode_display(buf, config, key, value)
            })
        }
    };
}

pub(crate) use field_methods;

/// Builder for a single log record
///
/// # Example
///
/// ```
/// use rust_event_logger::{Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let logger = Logger::json(sink.clone());
///
/// logger.info().str("user", "john").i64("id", 42).msg("login");
///
/// assert_eq!(
///     sink.lines(),
///     vec![r#"{"level":"info","message":"login","user":"john","id":42}"#]
/// );
/// ```
#[must_use = "an event writes nothing until `msg`, `msgf` or `send` is called"]
pub struct Event<'a> {
    inner: Option<ActiveEvent<'a>>,
}

struct ActiveEvent<'a> {
    logger: &'a Logger,
    level: LogLevel,
    buf: PooledBuffer<'a>,
    truncated: bool,
}

impl<'a> Event<'a> {
    pub(crate) fn new(logger: &'a Logger, level: LogLevel, buf: PooledBuffer<'a>) -> Self {
        Self {
            inner: Some(ActiveEvent {
                logger,
                level,
                buf,
                truncated: false,
            }),
        }
    }

    pub(crate) const fn disabled() -> Self {
        Self { inner: None }
    }

    /// Whether this event will produce a record
    ///
    /// Use it to skip preparing expensive field values.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.inner.is_some()
    }

    pub fn level(&self) -> Option<LogLevel> {
        self.inner.as_ref().map(|active| active.level)
    }

    fn field<F>(mut self, encode: F) -> Self
    where
        F: FnOnce(&mut Vec<u8>, &EncoderConfig) -> Result<()>,
    {
        if let Some(active) = self.inner.as_mut() {
            let config = &*active.logger.config;
            if let Err(err) = encode(&mut *active.buf, config) {
                active.fail(err);
            }
        }
        self
    }

    field_methods!();

    /// Write the record with `message`
    pub fn msg(self, message: &str) {
        self.finish(|buf, config| encoder::encode_message(buf, config, message.as_bytes()));
    }

    /// Write the record with a message that may not be valid UTF-8
    pub fn msg_lossy(self, message: &[u8]) {
        self.finish(|buf, config| encoder::encode_message(buf, config, message));
    }

    /// Write the record with a formatted message
    ///
    /// The arguments are formatted straight into the record buffer.
    pub fn msgf(self, args: fmt::Arguments<'_>) {
        self.finish(|buf, config| encoder::encode_message_fmt(buf, config, args));
    }

    /// Write the record with an empty message
    pub fn send(self) {
        self.finish(|_, _| Ok(()));
    }

    /// Drop the event without writing anything
    ///
    /// Equivalent to letting the event go out of scope.
    pub fn discard(self) {}

    fn finish<F>(mut self, encode_message: F)
    where
        F: FnOnce(&mut Vec<u8>, &EncoderConfig) -> Result<()>,
    {
        if let Some(active) = self.inner.take() {
            active.emit(encode_message);
        }
    }
}

impl<'a> ActiveEvent<'a> {
    fn fail(&mut self, err: LoggerError) {
        if matches!(err, LoggerError::RecordTooLarge { .. }) {
            if self.truncated {
                return;
            }
            self.truncated = true;
        }
        self.logger.metrics.record_error(&err);
        self.logger.report(&err);
    }

    fn emit<F>(mut self, encode_message: F)
    where
        F: FnOnce(&mut Vec<u8>, &EncoderConfig) -> Result<()>,
    {
        let logger = self.logger;
        let config = &*logger.config;

        let fields_end = self.buf.len();
        if config.record_time {
            if let Err(err) = encoder::encode_record_time(&mut *self.buf, config, &Utc::now()) {
                self.fail(err);
            }
        }
        let time_end = self.buf.len();
        if let Err(err) = encode_message(&mut *self.buf, config) {
            self.fail(err);
        }

        let record = Record {
            level: self.level,
            time: (time_end > fields_end).then(|| &self.buf[fields_end..time_end]),
            message: &self.buf[time_end..],
            fields: &self.buf[..fields_end],
        };
        logger.dispatch(&record);

        if self.level == LogLevel::Fatal {
            logger.flush_or_report();
            std::process::exit(1);
        }
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("level", &self.level())
            .field("len", &self.inner.as_ref().map(|active| active.buf.len()))
            .finish()
    }
}
