//! Main logger implementation

use super::{
    buffer::{BufferPool, PoolConfig},
    context::{ContextBuilder, TraceContext, PARENT_SPAN_ID_KEY, SPAN_ID_KEY, TRACE_ID_KEY},
    encoder::{EncoderConfig, Limits},
    error::{self, ErrorCallback, LoggerError, Result},
    event::Event,
    handler::{Handler, Record},
    log_level::{AtomicLevel, LogLevel},
    metrics::LoggerMetrics,
    timestamp::{DurationUnit, TimestampFormat},
};
use crate::handlers::JsonHandler;
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Level-gated entry point for structured records
///
/// A `Logger` is cheap to clone; clones share the handler, level threshold,
/// buffer pool, metrics and error callback. Loggers derived with
/// [`with`](Logger::with) or [`bind_context`](Logger::bind_context) share the
/// handler, pool and metrics but start with their own copy of the threshold.
///
/// # Example
///
/// ```
/// use rust_event_logger::{LogLevel, Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let logger = Logger::json(sink.clone());
///
/// logger.set_level(LogLevel::Warn);
/// logger.info().msg("dropped");
/// logger.warn().f64("load", 0.93).msg("high load");
///
/// assert_eq!(sink.lines(), vec![r#"{"level":"warn","message":"high load","load":0.93}"#]);
/// ```
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
    level: Arc<AtomicLevel>,
    pub(crate) context: Arc<[u8]>,
    pub(crate) config: Arc<EncoderConfig>,
    pool: Arc<BufferPool>,
    pub(crate) metrics: Arc<LoggerMetrics>,
    on_error: Option<ErrorCallback>,
}

impl Logger {
    /// Create a logger at `Info` level writing through `handler`
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        Self::builder().handler(handler).build()
    }

    /// Create a logger writing newline-delimited JSON to `writer`
    pub fn json<W: Write + Send + 'static>(writer: W) -> Self {
        Self::new(JsonHandler::new(writer))
    }

    /// Create a logger writing human-readable lines to `writer`
    #[cfg(feature = "console")]
    pub fn console<W: Write + Send + 'static>(writer: W) -> Self {
        Self::new(crate::handlers::ConsoleHandler::new(writer))
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Replace the level threshold
    ///
    /// Takes effect immediately on every thread using this logger or a clone
    /// of it.
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level);
    }

    pub fn level(&self) -> LogLevel {
        self.level.load()
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.level.is_enabled(level)
    }

    /// Install the callback that receives validation and write failures
    ///
    /// Loggers derived afterwards inherit it; existing clones keep theirs.
    pub fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.on_error = Some(callback);
    }

    /// Start an event at `level`
    ///
    /// Returns an inert event, without touching the buffer pool, when the
    /// level is disabled.
    #[inline]
    pub fn log(&self, level: LogLevel) -> Event<'_> {
        if !self.level.is_enabled(level) {
            return Event::disabled();
        }
        let mut buf = self.pool.acquire();
        buf.extend_from_slice(&self.context);
        Event::new(self, level, buf)
    }

    #[inline]
    pub fn trace(&self) -> Event<'_> {
        self.log(LogLevel::Trace)
    }

    #[inline]
    pub fn debug(&self) -> Event<'_> {
        self.log(LogLevel::Debug)
    }

    #[inline]
    pub fn info(&self) -> Event<'_> {
        self.log(LogLevel::Info)
    }

    #[inline]
    pub fn warn(&self) -> Event<'_> {
        self.log(LogLevel::Warn)
    }

    #[inline]
    pub fn error(&self) -> Event<'_> {
        self.log(LogLevel::Error)
    }

    /// Start a fatal event
    ///
    /// Finishing it writes the record, flushes the handler and exits the
    /// process with status 1.
    #[inline]
    pub fn fatal(&self) -> Event<'_> {
        self.log(LogLevel::Fatal)
    }

    /// Start building a logger with additional persistent fields
    pub fn with(&self) -> ContextBuilder<'_> {
        ContextBuilder::new(self)
    }

    /// Derive a logger carrying the trace and span identifiers of `ctx`
    ///
    /// Missing identifiers are skipped.
    pub fn bind_context<C: TraceContext + ?Sized>(&self, ctx: &C) -> Logger {
        let mut builder = self.with();
        if let Some(id) = ctx.trace_id() {
            builder = builder.str(TRACE_ID_KEY, id);
        }
        if let Some(id) = ctx.span_id() {
            builder = builder.str(SPAN_ID_KEY, id);
        }
        if let Some(id) = ctx.parent_span_id() {
            builder = builder.str(PARENT_SPAN_ID_KEY, id);
        }
        builder.logger()
    }

    pub fn flush(&self) -> Result<()> {
        self.handler.flush()
    }

    /// Get logger metrics for observability
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    pub(crate) fn derive(&self, context: Arc<[u8]>) -> Logger {
        Logger {
            handler: Arc::clone(&self.handler),
            level: Arc::new(AtomicLevel::new(self.level())),
            context,
            config: Arc::clone(&self.config),
            pool: Arc::clone(&self.pool),
            metrics: Arc::clone(&self.metrics),
            on_error: self.on_error.clone(),
        }
    }

    pub(crate) fn report(&self, err: &LoggerError) {
        error::report(self.on_error.as_ref(), err);
    }

    /// Hand a finished record to the handler
    ///
    /// A panicking handler is contained here and reported like a failed
    /// write.
    pub(crate) fn dispatch(&self, record: &Record<'_>) {
        let handler = &self.handler;
        let result = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(record)));
        let err = match result {
            Ok(Ok(())) => {
                self.metrics.record_written();
                return;
            }
            Ok(Err(err)) => err,
            Err(_) => LoggerError::handler_panicked(handler.name()),
        };
        self.metrics.record_error(&err);
        self.report(&err);
    }

    pub(crate) fn flush_or_report(&self) {
        let handler = &self.handler;
        match panic::catch_unwind(AssertUnwindSafe(|| handler.flush())) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => self.report(&err),
            Err(_) => self.report(&LoggerError::handler_panicked(handler.name())),
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handler", &self.handler.name())
            .field("level", &self.level())
            .field("encoding", &self.config.encoding)
            .field("context_len", &self.context.len())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Builder for constructing a Logger with a fluent API
///
/// # Example
///
/// ```
/// use rust_event_logger::{JsonHandler, LogLevel, Logger, MemorySink, TimestampFormat};
/// use std::sync::Arc;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .handler(JsonHandler::new(sink.clone()))
///     .level(LogLevel::Debug)
///     .timestamp(TimestampFormat::UnixMillis)
///     .on_error(Arc::new(|err: &rust_event_logger::LoggerError| eprintln!("logging failed: {}", err)))
///     .build();
///
/// logger.debug().msg("ready");
/// assert!(sink.lines()[0].starts_with(r#"{"level":"debug","time":"#));
/// ```
pub struct LoggerBuilder {
    level: LogLevel,
    handler: Option<Arc<dyn Handler>>,
    on_error: Option<ErrorCallback>,
    time_format: TimestampFormat,
    record_time: bool,
    duration_unit: DurationUnit,
    limits: Limits,
    pool: PoolConfig,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            handler: None,
            on_error: None,
            time_format: TimestampFormat::default(),
            record_time: false,
            duration_unit: DurationUnit::default(),
            limits: Limits::default(),
            pool: PoolConfig::default(),
        }
    }

    /// Set the initial level threshold
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the handler; defaults to JSON on stdout
    #[must_use]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Set an already shared handler
    #[must_use]
    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    #[must_use]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Stamp every record with a `time` entry in `format`
    ///
    /// The same format is used for `time` fields.
    #[must_use]
    pub fn timestamp(mut self, format: TimestampFormat) -> Self {
        self.time_format = format;
        self.record_time = true;
        self
    }

    /// Set the format of `time` fields without stamping records
    #[must_use]
    pub fn time_format(mut self, format: TimestampFormat) -> Self {
        self.time_format = format;
        self
    }

    #[must_use]
    pub fn duration_unit(mut self, unit: DurationUnit) -> Self {
        self.duration_unit = unit;
        self
    }

    /// Override key, value and record size limits
    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn build(self) -> Logger {
        let handler = self
            .handler
            .unwrap_or_else(|| Arc::new(JsonHandler::stdout()));
        let config = EncoderConfig {
            encoding: handler.encoding(),
            limits: self.limits.normalized(),
            time_format: self.time_format,
            duration_unit: self.duration_unit,
            record_time: self.record_time,
        };

        Logger {
            handler,
            level: Arc::new(AtomicLevel::new(self.level)),
            context: Arc::from(Vec::new()),
            config: Arc::new(config),
            pool: Arc::new(BufferPool::new(self.pool)),
            metrics: Arc::new(LoggerMetrics::new()),
            on_error: self.on_error,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::Encoding;
    use crate::handlers::MemorySink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PanickingHandler;

    impl Handler for PanickingHandler {
        fn encoding(&self) -> Encoding {
            Encoding::Json
        }

        fn handle(&self, _record: &Record<'_>) -> Result<()> {
            panic!("handler bug");
        }

        fn flush(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[test]
    fn test_builder_basic() {
        let logger = Logger::builder().level(LogLevel::Debug).build();
        assert_eq!(logger.level(), LogLevel::Debug);
        assert!(logger.is_enabled(LogLevel::Debug));
        assert!(!logger.is_enabled(LogLevel::Trace));
    }

    #[test]
    fn test_builder_default() {
        let logger = LoggerBuilder::default().build();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(format!("{:?}", logger).contains("json"));
    }

    #[test]
    fn test_set_level_visible_to_clones() {
        let logger = Logger::json(MemorySink::new());
        let clone = logger.clone();

        logger.set_level(LogLevel::Error);
        assert_eq!(clone.level(), LogLevel::Error);
        assert!(clone.fatal().enabled());
    }

    #[test]
    fn test_handler_panic_is_contained() {
        let failures = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&failures);
        let logger = Logger::builder()
            .handler(PanickingHandler)
            .on_error(Arc::new(move |err: &LoggerError| {
                assert!(matches!(err, LoggerError::HandlerPanicked { .. }));
                seen.fetch_add(1, Ordering::Relaxed);
            }))
            .build();

        logger.info().msg("first");
        logger.info().msg("second");

        assert_eq!(failures.load(Ordering::Relaxed), 2);
        assert_eq!(logger.metrics().write_failures(), 2);
        assert_eq!(logger.metrics().records_written(), 0);
    }

    #[test]
    fn test_record_time_prefix() {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .handler(JsonHandler::new(sink.clone()))
            .timestamp(TimestampFormat::Iso8601)
            .build();

        logger.info().i64("n", 1).msg("stamped");

        let line = &sink.lines()[0];
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        let time = parsed["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
        assert!(line.ends_with(r#""message":"stamped","n":1}"#));
    }

    #[test]
    fn test_invalid_time_format_reported_as_render_error() {
        let sink = MemorySink::new();
        let errors = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = Arc::clone(&errors);
        let logger = Logger::builder()
            .handler(JsonHandler::new(sink.clone()))
            .timestamp(TimestampFormat::Custom("%Q".to_string()))
            .on_error(Arc::new(move |err: &LoggerError| seen.lock().push(err.to_string())))
            .build();

        logger.info().i64("n", 1).msg("unstamped");

        assert_eq!(
            *errors.lock(),
            vec!["Rendering of field 'time' failed: field omitted".to_string()]
        );
        assert_eq!(logger.metrics().records_truncated(), 0);
        assert_eq!(logger.metrics().fields_rejected(), 1);
        assert_eq!(
            sink.lines(),
            vec![r#"{"level":"info","message":"unstamped","n":1}"#]
        );
    }

    #[test]
    fn test_metrics_shared_with_derived() {
        let sink = MemorySink::new();
        let logger = Logger::json(sink.clone());
        let child = logger.with().bool("child", true).logger();

        logger.info().msg("a");
        child.info().msg("b");

        assert_eq!(logger.metrics().records_written(), 2);
        assert_eq!(sink.lines().len(), 2);
    }
}
