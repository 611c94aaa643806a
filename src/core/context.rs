//! Persistent fields and trace correlation
//!
//! [`ContextBuilder`] collects fields that every record of a derived logger
//! will carry. The fields are encoded once, when the builder is created, and
//! frozen into an `Arc<[u8]>` that each event copies into its buffer.

use super::{encoder::EncoderConfig, error::Result, event::field_methods, logger::Logger};
use serde::{Deserialize, Serialize};

/// Key for the trace identifier
pub const TRACE_ID_KEY: &str = "trace_id";

/// Key for the span identifier
pub const SPAN_ID_KEY: &str = "span_id";

/// Key for the parent span identifier
pub const PARENT_SPAN_ID_KEY: &str = "parent_span_id";

/// Builder for a logger with additional persistent fields
///
/// # Example
///
/// ```
/// use rust_event_logger::{Logger, MemorySink};
///
/// let sink = MemorySink::new();
/// let root = Logger::json(sink.clone());
/// let requests = root.with().str("component", "http").logger();
///
/// requests.info().u32("status", 200).msg("served");
/// root.info().msg("untouched");
///
/// let lines = sink.lines();
/// assert!(lines[0].ends_with(r#""component":"http","status":200}"#));
/// assert!(!lines[1].contains("component"));
/// ```
#[must_use = "call `logger()` to obtain the derived logger"]
pub struct ContextBuilder<'a> {
    parent: &'a Logger,
    buf: Vec<u8>,
}

impl<'a> ContextBuilder<'a> {
    pub(crate) fn new(parent: &'a Logger) -> Self {
        Self {
            parent,
            buf: parent.context.to_vec(),
        }
    }

    fn field<F>(mut self, encode: F) -> Self
    where
        F: FnOnce(&mut Vec<u8>, &EncoderConfig) -> Result<()>,
    {
        if let Err(err) = encode(&mut self.buf, &*self.parent.config) {
            self.parent.metrics.record_error(&err);
            self.parent.report(&err);
        }
        self
    }

    field_methods!();

    /// Freeze the collected fields into a new logger
    ///
    /// The parent logger is left unchanged.
    pub fn logger(self) -> Logger {
        self.parent.derive(self.buf.into())
    }
}

/// Source of trace correlation identifiers
///
/// Implement this for whatever request context type the application already
/// has; the logger only needs the identifiers as strings.
pub trait TraceContext {
    fn trace_id(&self) -> Option<&str>;
    fn span_id(&self) -> Option<&str>;

    fn parent_span_id(&self) -> Option<&str> {
        None
    }
}

/// Owned trace identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingContext {
    /// Trace ID for request correlation
    pub trace_id: String,

    /// Span ID for this operation
    pub span_id: String,

    /// Parent span ID (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
}

impl TracingContext {
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
            parent_span_id: None,
        }
    }

    /// Set parent span ID
    #[must_use]
    pub fn with_parent(mut self, parent_span_id: impl Into<String>) -> Self {
        self.parent_span_id = Some(parent_span_id.into());
        self
    }
}

fn non_empty(id: &str) -> Option<&str> {
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

impl TraceContext for TracingContext {
    fn trace_id(&self) -> Option<&str> {
        non_empty(&self.trace_id)
    }

    fn span_id(&self) -> Option<&str> {
        non_empty(&self.span_id)
    }

    fn parent_span_id(&self) -> Option<&str> {
        self.parent_span_id.as_deref().and_then(non_empty)
    }
}

impl<T: TraceContext + ?Sized> TraceContext for &T {
    fn trace_id(&self) -> Option<&str> {
        (**self).trace_id()
    }

    fn span_id(&self) -> Option<&str> {
        (**self).span_id()
    }

    fn parent_span_id(&self) -> Option<&str> {
        (**self).parent_span_id()
    }
}

impl<T: TraceContext> TraceContext for Option<T> {
    fn trace_id(&self) -> Option<&str> {
        self.as_ref().and_then(TraceContext::trace_id)
    }

    fn span_id(&self) -> Option<&str> {
        self.as_ref().and_then(TraceContext::span_id)
    }

    fn parent_span_id(&self) -> Option<&str> {
        self.as_ref().and_then(TraceContext::parent_span_id)
    }
}
