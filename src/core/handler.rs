//! Handler trait for record destinations

use super::{encoder::Encoding, error::Result, log_level::LogLevel};

/// One finished record, as pre-encoded byte slices borrowed from the event
///
/// All slices are already sanitized for the handler's [`Encoding`]: a JSON
/// handler can splice `message` between quotes and append `fields` verbatim.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: LogLevel,
    /// Formatted timestamp, present when the logger records time
    pub time: Option<&'a [u8]>,
    /// Escaped message text without surrounding quotes
    pub message: &'a [u8],
    /// Persistent fields followed by event fields, each self-delimiting
    pub fields: &'a [u8],
}

/// Sink-facing half of a logger
///
/// A handler must write each record with a single write to its sink, so
/// concurrent records never interleave. It is shared by every logger derived
/// from the one it was installed on.
pub trait Handler: Send + Sync {
    /// Wire form the logger must encode fields in
    fn encoding(&self) -> Encoding;
    fn handle(&self, record: &Record<'_>) -> Result<()>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}
