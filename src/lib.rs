//! # Rust Event Logger
//!
//! A structured-event logging engine with a zero-allocation hot path.
//!
//! ## Features
//!
//! - **Level gated**: a disabled call returns before touching any buffer
//! - **Pooled buffers**: steady-state logging reuses buffers instead of allocating
//! - **Sanitizing encoders**: records are always valid UTF-8 and a single line
//! - **Bounded**: per-key, per-value and per-record size limits
//! - **JSON and console output**: one write per record, safe to share across threads
//!
//! ## Example
//!
//! ```
//! use rust_event_logger::{Logger, MemorySink};
//!
//! let sink = MemorySink::new();
//! let logger = Logger::json(sink.clone());
//!
//! logger.info().str("user", "john").i64("id", 42).msg("login");
//!
//! assert_eq!(
//!     sink.to_string_lossy(),
//!     "{\"level\":\"info\",\"message\":\"login\",\"user\":\"john\",\"id\":42}\n"
//! );
//! ```

pub mod core;
pub mod handlers;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::handlers::ConsoleHandler;
    pub use crate::handlers::{JsonHandler, MemorySink};
    pub use crate::core::{
        ErrorCallback, Event, Handler, LogLevel, Logger, LoggerBuilder, LoggerError, Result,
        TimestampFormat, TraceContext, TracingContext,
    };
}

#[cfg(feature = "console")]
pub use handlers::ConsoleHandler;
pub use handlers::{JsonHandler, MemorySink};
pub use crate::core::{
    AtomicLevel, BufferPool, ContextBuilder, DurationUnit, EncoderConfig, Encoding,
    ErrorCallback, Event, Handler, KeyError, Limits, LogLevel, Logger, LoggerBuilder,
    LoggerError, LoggerMetrics, PoolConfig, Record, Result, TimestampFormat, TraceContext,
    TracingContext,
};
