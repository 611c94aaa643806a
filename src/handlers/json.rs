//! JSON handler for structured logging
//!
//! Writes each record as a single-line JSON object (JSONL format), compatible
//! with log aggregation tools like ELK or Loki:
//!
//! ```text
//! {"level":"info","time":"2025-01-08T10:30:45.123Z","message":"login","user":"john","id":42}
//! ```
//!
//! `level` and `message` always come first, followed by persistent fields and
//! event fields in the order they were added.

use crate::core::{Encoding, Handler, LoggerError, Record, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Scratch buffers above this capacity are released after the write
const SCRATCH_RETAIN_CAPACITY: usize = 64 * 1024;

/// JSON lines handler over any `Write` sink
pub struct JsonHandler<W: Write + Send> {
    inner: Mutex<Inner<W>>,
}

struct Inner<W> {
    sink: W,
    scratch: Vec<u8>,
}

impl<W: Write + Send> JsonHandler<W> {
    pub fn new(sink: W) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sink,
                scratch: Vec::with_capacity(1024),
            }),
        }
    }

    /// Consume the handler and return the sink
    pub fn into_inner(self) -> W {
        self.inner.into_inner().sink
    }
}

impl JsonHandler<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl JsonHandler<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl JsonHandler<File> {
    /// Append records to the file at `path`, creating it if needed
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

/// Frame a record as one JSON object terminated by a newline
fn frame(out: &mut Vec<u8>, record: &Record<'_>) {
    out.extend_from_slice(b"{\"level\":\"");
    out.extend_from_slice(record.level.as_str().as_bytes());
    out.push(b'"');
    if let Some(time) = record.time {
        out.extend_from_slice(b",\"time\":");
        out.extend_from_slice(time);
    }
    out.extend_from_slice(b",\"message\":\"");
    out.extend_from_slice(record.message);
    out.push(b'"');
    out.extend_from_slice(record.fields);
    out.extend_from_slice(b"}\n");
}

impl<W: Write + Send> Handler for JsonHandler<W> {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    fn handle(&self, record: &Record<'_>) -> Result<()> {
        let mut inner = self.inner.lock();
        let Inner { sink, scratch } = &mut *inner;

        scratch.clear();
        frame(scratch, record);
        let written = sink.write_all(scratch);

        if scratch.capacity() > SCRATCH_RETAIN_CAPACITY {
            *scratch = Vec::with_capacity(1024);
        }
        written.map_err(|e| LoggerError::sink_write("json", e))
    }

    fn flush(&self) -> Result<()> {
        self.inner
            .lock()
            .sink
            .flush()
            .map_err(|e| LoggerError::sink_write("json", e))
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use crate::handlers::MemorySink;

    #[test]
    fn test_frame_without_time() {
        let sink = MemorySink::new();
        let handler = JsonHandler::new(sink.clone());
        handler
            .handle(&Record {
                level: LogLevel::Error,
                time: None,
                message: b"disk full",
                fields: b",\"free\":0",
            })
            .unwrap();

        assert_eq!(
            sink.to_string_lossy(),
            "{\"level\":\"error\",\"message\":\"disk full\",\"free\":0}\n"
        );
    }

    #[test]
    fn test_frame_with_time() {
        let sink = MemorySink::new();
        let handler = JsonHandler::new(sink.clone());
        handler
            .handle(&Record {
                level: LogLevel::Info,
                time: Some(b"1736332245"),
                message: b"",
                fields: b"",
            })
            .unwrap();

        let line = sink.lines().remove(0);
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["time"], 1736332245);
        assert_eq!(parsed["message"], "");
    }

    #[test]
    fn test_sink_error_is_returned() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let handler = JsonHandler::new(Broken);
        let err = handler
            .handle(&Record {
                level: LogLevel::Info,
                time: None,
                message: b"x",
                fields: b"",
            })
            .unwrap_err();
        assert!(matches!(err, LoggerError::SinkWrite { handler: "json", .. }));
    }

    #[test]
    fn test_file_handler_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.jsonl");

        let logger = crate::Logger::new(JsonHandler::file(&path).unwrap());
        logger.info().msg("first");
        logger.info().msg("second");
        drop(logger);

        let logger = crate::Logger::new(JsonHandler::file(&path).unwrap());
        logger.info().msg("third");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }
}
