//! Console handler for human-readable output
//!
//! Each record is one line:
//!
//! ```text
//! 2025-01-08T10:30:45.123Z INFO  login  user=john id=42
//! ```
//!
//! The timestamp only appears when the logger records time. The message is
//! quoted and escaped unless it is a single plain token, so it cannot be read
//! as fields. Level labels are padded to five columns and colored per level
//! unless colors are disabled or the terminal does not support them.

use crate::core::{Encoding, Handler, LogLevel, LoggerError, Record, Result};
use parking_lot::Mutex;
use std::io::{self, Write};

const SCRATCH_RETAIN_CAPACITY: usize = 64 * 1024;

pub struct ConsoleHandler<W: Write + Send> {
    inner: Mutex<Inner<W>>,
    use_colors: bool,
    labels: [String; 6],
}

struct Inner<W> {
    sink: W,
    scratch: Vec<u8>,
}

/// Padded labels, wrapped in raw ANSI sequences so that `with_colors(true)`
/// applies regardless of `colored`'s own terminal detection
fn level_labels(use_colors: bool) -> [String; 6] {
    LogLevel::ALL.map(|level| {
        if use_colors {
            format!(
                "\x1b[{}m{:<5}\x1b[0m",
                level.color_code().to_fg_str(),
                level.to_str()
            )
        } else {
            format!("{:<5}", level.to_str())
        }
    })
}

impl<W: Write + Send> ConsoleHandler<W> {
    /// Create a handler; colors follow the terminal's capabilities
    pub fn new(sink: W) -> Self {
        let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();
        Self {
            inner: Mutex::new(Inner {
                sink,
                scratch: Vec::with_capacity(1024),
            }),
            use_colors,
            labels: level_labels(use_colors),
        }
    }

    /// Force colors on or off
    ///
    /// Must be set before the handler is given to a logger.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self.labels = level_labels(use_colors);
        self
    }

    pub fn use_colors(&self) -> bool {
        self.use_colors
    }
}

impl ConsoleHandler<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl ConsoleHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> Handler for ConsoleHandler<W> {
    fn encoding(&self) -> Encoding {
        Encoding::Console {
            colors: self.use_colors,
        }
    }

    fn handle(&self, record: &Record<'_>) -> Result<()> {
        let mut inner = self.inner.lock();
        let Inner { sink, scratch } = &mut *inner;

        scratch.clear();
        if let Some(time) = record.time {
            scratch.extend_from_slice(time);
            scratch.push(b' ');
        }
        scratch.extend_from_slice(self.labels[record.level as usize].as_bytes());
        scratch.push(b' ');
        scratch.extend_from_slice(record.message);
        if !record.fields.is_empty() {
            // Fields carry their own leading space.
            scratch.push(b' ');
            scratch.extend_from_slice(record.fields);
        }
        scratch.push(b'\n');

        let written = sink.write_all(scratch);
        if scratch.capacity() > SCRATCH_RETAIN_CAPACITY {
            *scratch = Vec::with_capacity(1024);
        }
        written.map_err(|e| LoggerError::sink_write("console", e))
    }

    fn flush(&self) -> Result<()> {
        self.inner
            .lock()
            .sink
            .flush()
            .map_err(|e| LoggerError::sink_write("console", e))
    }

    fn name(&self) -> &str {
        "console"
    }
}
