//! Core logger types and traits

pub mod buffer;
pub mod context;
pub mod encoder;
pub mod error;
pub mod event;
pub mod handler;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod timestamp;

pub use buffer::{BufferPool, PoolConfig, PooledBuffer};
pub use context::{ContextBuilder, TraceContext, TracingContext};
pub use encoder::{EncoderConfig, Encoding, Limits};
pub use error::{ErrorCallback, KeyError, LoggerError, Result};
pub use event::Event;
pub use handler::{Handler, Record};
pub use log_level::{AtomicLevel, LogLevel};
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use timestamp::{DurationUnit, TimestampFormat};
