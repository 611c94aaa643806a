//! Sanitizing field encoders
//!
//! Each `encode_*` function appends exactly one field to a record buffer in
//! the logger's [`Encoding`], or appends nothing at all. Fields are written as
//! self-delimiting fragments so that a buffer of fields can be spliced into a
//! record by a handler without re-parsing:
//!
//! - JSON: `,"key":value`
//! - Console: ` key=value`
//!
//! # Failure policy
//!
//! Encoders never panic. The returned `Result` only tells the caller what
//! happened so it can be reported:
//!
//! - [`LoggerError::InvalidKey`], [`LoggerError::RecordTooLarge`] and
//!   [`LoggerError::Render`]: the buffer is left exactly as it was.
//! - [`LoggerError::ValueTruncated`]: the field was written with its value
//!   clamped to the configured limit.
//!
//! # Sanitization
//!
//! Quotes, backslashes, and every ASCII control character are escaped with
//! JSON rules, and invalid UTF-8 is replaced with U+FFFD, so the output is
//! always valid UTF-8 and a single line. Non-finite floats are written as the
//! bare tokens `NaN`, `+Inf` and `-Inf`; strict JSON parsers reject these.

use super::error::{KeyError, LoggerError, Result};
use super::timestamp::{system_time_to_utc, DurationUnit, TimestampFormat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::io::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, SystemTime};

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 256;

/// Maximum string value length in bytes before truncation
pub const MAX_STRING_LEN: usize = 65_536;

/// Maximum length of one serialized record in bytes
pub const MAX_RECORD_LEN: usize = 1_048_576;

/// Bytes reserved for the record framing a handler adds around the fields
pub const FRAME_OVERHEAD: usize = 64;

/// Key used by [`encode_err`]
pub const ERROR_KEY: &str = "error";

const MIN_RECORD_LEN: usize = 256;
const REPLACEMENT: &[u8] = "\u{FFFD}".as_bytes();
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const KEY_COLOR: &[u8] = b"\x1b[36m";
const ERROR_KEY_COLOR: &[u8] = b"\x1b[31m";
const RESET: &[u8] = b"\x1b[0m";

/// Wire form of encoded fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Newline-delimited JSON objects
    Json,
    /// Human-readable `key=value` text, optionally with ANSI colors
    Console { colors: bool },
}

/// Size limits enforced while encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_key_len: usize,
    pub max_string_len: usize,
    pub max_record_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_len: MAX_KEY_LEN,
            max_string_len: MAX_STRING_LEN,
            max_record_len: MAX_RECORD_LEN,
        }
    }
}

impl Limits {
    /// Raise zero or tiny limits to the smallest workable values
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            max_key_len: self.max_key_len.max(1),
            max_string_len: self.max_string_len.max(1),
            max_record_len: self.max_record_len.max(MIN_RECORD_LEN),
        }
    }

    /// Bytes available to fields, timestamp and message of one record
    #[inline]
    pub fn field_budget(&self) -> usize {
        self.max_record_len.saturating_sub(FRAME_OVERHEAD)
    }
}

/// Everything an encoder needs to know about the target record format
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub encoding: Encoding,
    pub limits: Limits,
    /// Format of `time` fields and of the per-record timestamp
    pub time_format: TimestampFormat,
    pub duration_unit: DurationUnit,
    /// Whether every record carries a `time` entry
    pub record_time: bool,
}

impl EncoderConfig {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            limits: Limits::default(),
            time_format: TimestampFormat::default(),
            duration_unit: DurationUnit::default(),
            record_time: false,
        }
    }
}

/// Escaping rules applied to text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Escape {
    /// JSON string contents: quotes, backslashes and control characters
    Json,
    /// Unquoted console text: control characters only
    Bare,
}

fn escape_byte(b: u8, escape: Escape) -> Option<([u8; 6], usize)> {
    let short = match b {
        b'"' | b'\\' if escape == Escape::Json => b,
        b'\n' => b'n',
        b'\r' => b'r',
        b'\t' => b't',
        0x08 => b'b',
        0x0c => b'f',
        0x00..=0x1f | 0x7f => {
            let mut seq = *b"\\u0000";
            seq[4] = HEX_DIGITS[(b >> 4) as usize];
            seq[5] = HEX_DIGITS[(b & 0x0f) as usize];
            return Some((seq, 6));
        }
        _ => return None,
    };
    Some(([b'\\', short, 0, 0, 0, 0], 2))
}

/// Append `input` escaped, growing `out` by at most `budget` bytes
///
/// Returns `false` if the budget ran out; the text written so far ends on a
/// code-point boundary.
pub(crate) fn write_escaped(out: &mut Vec<u8>, input: &[u8], escape: Escape, budget: usize) -> bool {
    let mut used = 0;
    for chunk in input.utf8_chunks() {
        let valid = chunk.valid();
        let mut start = 0;
        for (i, &b) in valid.as_bytes().iter().enumerate() {
            if let Some((seq, len)) = escape_byte(b, escape) {
                if !push_run(out, &valid[start..i], &mut used, budget) || used + len > budget {
                    return false;
                }
                out.extend_from_slice(&seq[..len]);
                used += len;
                start = i + 1;
            }
        }
        if !push_run(out, &valid[start..], &mut used, budget) {
            return false;
        }
        if !chunk.invalid().is_empty() {
            if used + REPLACEMENT.len() > budget {
                return false;
            }
            out.extend_from_slice(REPLACEMENT);
            used += REPLACEMENT.len();
        }
    }
    true
}

fn push_run(out: &mut Vec<u8>, run: &str, used: &mut usize, budget: usize) -> bool {
    let left = budget - *used;
    if run.len() <= left {
        out.extend_from_slice(run.as_bytes());
        *used += run.len();
        return true;
    }
    let mut cut = left;
    while !run.is_char_boundary(cut) {
        cut -= 1;
    }
    out.extend_from_slice(&run.as_bytes()[..cut]);
    *used += cut;
    false
}

/// Clamp to `limit` bytes without splitting a multi-byte code point
fn clamp(bytes: &[u8], limit: usize) -> (&[u8], bool) {
    if bytes.len() <= limit {
        return (bytes, false);
    }
    let mut end = limit;
    for _ in 0..3 {
        if end > 0 && bytes[end] & 0xC0 == 0x80 {
            end -= 1;
        } else {
            break;
        }
    }
    (&bytes[..end], true)
}

fn needs_quotes(bytes: &[u8]) -> bool {
    bytes.is_empty()
        || bytes
            .iter()
            .any(|&b| b <= b' ' || b == b'=' || b == b'"' || b == 0x7f)
}

/// `fmt::Write` adapter that escapes into a byte buffer within a budget
///
/// Once the budget is exhausted every further write fails, which stops
/// well-behaved `Display` impls early.
pub(crate) struct TextWriter<'a> {
    out: &'a mut Vec<u8>,
    escape: Escape,
    left: usize,
    truncated: bool,
}

impl<'a> TextWriter<'a> {
    pub(crate) fn new(out: &'a mut Vec<u8>, escape: Escape, left: usize) -> Self {
        Self {
            out,
            escape,
            left,
            truncated: false,
        }
    }

    pub(crate) fn truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Write for TextWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Err(fmt::Error);
        }
        let before = self.out.len();
        let complete = write_escaped(self.out, s.as_bytes(), self.escape, self.left);
        self.left -= self.out.len() - before;
        if complete {
            Ok(())
        } else {
            self.truncated = true;
            Err(fmt::Error)
        }
    }
}

/// Result of writing one value, before it is mapped to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Written,
    Clamped,
    Overflow,
    Failed,
}

/// Validate a key: non-empty after trimming and at most `max_key_len` bytes
pub fn validate_key(key: &str, limits: &Limits) -> Result<()> {
    if key.len() > limits.max_key_len {
        return Err(LoggerError::invalid_key(KeyError::TooLong, key.len()));
    }
    if key.trim().is_empty() {
        return Err(LoggerError::invalid_key(KeyError::Empty, key.len()));
    }
    Ok(())
}

fn write_key(buf: &mut Vec<u8>, encoding: Encoding, key: &str, is_error: bool) {
    match encoding {
        Encoding::Json => {
            buf.extend_from_slice(b",\"");
            write_escaped(buf, key.as_bytes(), Escape::Json, usize::MAX);
            buf.extend_from_slice(b"\":");
        }
        Encoding::Console { colors } => {
            buf.push(b' ');
            if colors {
                buf.extend_from_slice(if is_error { ERROR_KEY_COLOR } else { KEY_COLOR });
            }
            let mut utf8 = [0u8; 4];
            for ch in key.chars() {
                if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') {
                    buf.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
                } else {
                    buf.push(b'_');
                }
            }
            if colors {
                buf.extend_from_slice(RESET);
            }
            buf.push(b'=');
        }
    }
}

/// Shared frame of every field encoder: validate, write key, write value,
/// roll back on failure
fn encode_field(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    is_error: bool,
    write_value: impl FnOnce(&mut Vec<u8>, usize) -> Outcome,
) -> Result<()> {
    validate_key(key, &config.limits)?;
    let budget = config.limits.field_budget();
    let mark = buf.len();
    if mark >= budget {
        return Err(LoggerError::record_too_large(config.limits.max_record_len));
    }

    write_key(buf, config.encoding, key, is_error);
    let mut outcome = write_value(buf, budget);
    if outcome != Outcome::Failed && buf.len() > budget {
        outcome = Outcome::Overflow;
    }

    match outcome {
        Outcome::Written => Ok(()),
        Outcome::Clamped => Err(LoggerError::value_truncated(config.limits.max_string_len)),
        Outcome::Overflow => {
            buf.truncate(mark);
            Err(LoggerError::record_too_large(config.limits.max_record_len))
        }
        Outcome::Failed => {
            buf.truncate(mark);
            Err(LoggerError::render(key))
        }
    }
}

fn write_quoted(buf: &mut Vec<u8>, bytes: &[u8], left: usize) -> bool {
    if left < 2 {
        return false;
    }
    buf.push(b'"');
    let complete = write_escaped(buf, bytes, Escape::Json, left - 2);
    buf.push(b'"');
    complete
}

fn write_text(buf: &mut Vec<u8>, encoding: Encoding, bytes: &[u8], budget: usize) -> bool {
    let left = budget.saturating_sub(buf.len());
    match encoding {
        Encoding::Console { .. } if !needs_quotes(bytes) => {
            write_escaped(buf, bytes, Escape::Bare, left)
        }
        _ => write_quoted(buf, bytes, left),
    }
}

fn encode_text(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, bytes: &[u8]) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| {
        let (value, clamped) = clamp(bytes, config.limits.max_string_len);
        if !write_text(buf, config.encoding, value, budget) {
            Outcome::Overflow
        } else if clamped {
            Outcome::Clamped
        } else {
            Outcome::Written
        }
    })
}

/// Encode a string field
pub fn encode_str(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: &str) -> Result<()> {
    encode_text(buf, config, key, value.as_bytes())
}

/// Encode a byte string as text, replacing invalid UTF-8 with U+FFFD
pub fn encode_str_lossy(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    value: &[u8],
) -> Result<()> {
    encode_text(buf, config, key, value)
}

/// Encode a list of strings as a JSON array (in both encodings)
pub fn encode_strs<S: AsRef<str>>(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    values: &[S],
) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| {
        let mut clamped_any = false;
        buf.push(b'[');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                buf.push(b',');
            }
            let (value, clamped) = clamp(value.as_ref().as_bytes(), config.limits.max_string_len);
            clamped_any |= clamped;
            if !write_quoted(buf, value, budget.saturating_sub(buf.len())) {
                return Outcome::Overflow;
            }
        }
        buf.push(b']');
        if clamped_any {
            Outcome::Clamped
        } else {
            Outcome::Written
        }
    })
}

/// Encode a signed integer field
pub fn encode_i64(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: i64) -> Result<()> {
    encode_field(buf, config, key, false, |buf, _| {
        let _ = write!(buf, "{}", value);
        Outcome::Written
    })
}

/// Encode an unsigned integer field
pub fn encode_u64(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: u64) -> Result<()> {
    encode_field(buf, config, key, false, |buf, _| {
        let _ = write!(buf, "{}", value);
        Outcome::Written
    })
}

fn write_non_finite(buf: &mut Vec<u8>, is_nan: bool, positive: bool) {
    if is_nan {
        buf.extend_from_slice(b"NaN");
    } else if positive {
        buf.extend_from_slice(b"+Inf");
    } else {
        buf.extend_from_slice(b"-Inf");
    }
}

/// Encode a 64-bit float field
///
/// Finite values use the shortest representation that round-trips.
pub fn encode_f64(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: f64) -> Result<()> {
    encode_field(buf, config, key, false, |buf, _| {
        if value.is_finite() {
            let _ = write!(buf, "{:?}", value);
        } else {
            write_non_finite(buf, value.is_nan(), value.is_sign_positive());
        }
        Outcome::Written
    })
}

/// Encode a 32-bit float field
pub fn encode_f32(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: f32) -> Result<()> {
    encode_field(buf, config, key, false, |buf, _| {
        if value.is_finite() {
            let _ = write!(buf, "{:?}", value);
        } else {
            write_non_finite(buf, value.is_nan(), value.is_sign_positive());
        }
        Outcome::Written
    })
}

/// Encode a boolean field
pub fn encode_bool(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: bool) -> Result<()> {
    encode_field(buf, config, key, false, |buf, _| {
        buf.extend_from_slice(if value { b"true" } else { b"false" });
        Outcome::Written
    })
}

/// Encode a duration: a number in the configured unit (JSON) or the human
/// form such as `12.5ms` (console)
pub fn encode_duration(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    value: Duration,
) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| {
        let left = budget.saturating_sub(buf.len());
        let mut writer = TextWriter::new(buf, Escape::Bare, left);
        let written = match config.encoding {
            Encoding::Json => config.duration_unit.write_to(&mut writer, value),
            Encoding::Console { .. } => fmt::Write::write_fmt(&mut writer, format_args!("{:?}", value)),
        };
        match (written, writer.truncated()) {
            (_, true) => Outcome::Overflow,
            (Ok(()), false) => Outcome::Written,
            (Err(_), false) => Outcome::Failed,
        }
    })
}

fn write_time_value(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    time: &DateTime<Utc>,
    budget: usize,
) -> Outcome {
    let format = &config.time_format;
    let quoted = match config.encoding {
        Encoding::Json => !format.is_numeric(),
        Encoding::Console { .. } => matches!(format, TimestampFormat::Custom(_)),
    };
    let left = budget.saturating_sub(buf.len());
    let reserved = if quoted { 2 } else { 0 };
    if left < reserved {
        return Outcome::Overflow;
    }

    if quoted {
        buf.push(b'"');
    }
    let escape = if quoted { Escape::Json } else { Escape::Bare };
    let (written, truncated) = {
        let mut writer = TextWriter::new(buf, escape, left - reserved);
        let written = format.write_to(&mut writer, time);
        (written, writer.truncated())
    };
    if quoted {
        buf.push(b'"');
    }

    match (written, truncated) {
        (_, true) => Outcome::Overflow,
        (Ok(()), false) => Outcome::Written,
        (Err(_), false) => Outcome::Failed,
    }
}

/// Encode an instant in the configured [`TimestampFormat`]
pub fn encode_time(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    value: &DateTime<Utc>,
) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| {
        write_time_value(buf, config, value, budget)
    })
}

/// Encode a `SystemTime`; instants chrono cannot represent become `null`
pub fn encode_system_time(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    value: SystemTime,
) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| match system_time_to_utc(value) {
        Some(time) => write_time_value(buf, config, &time, budget),
        None => {
            buf.extend_from_slice(b"null");
            Outcome::Written
        }
    })
}

/// Encode bytes as a lower-case hex string
pub fn encode_hex(buf: &mut Vec<u8>, config: &EncoderConfig, key: &str, value: &[u8]) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| {
        let max_input = config.limits.max_string_len / 2;
        let (input, clamped) = if value.len() > max_input {
            (&value[..max_input], true)
        } else {
            (value, false)
        };
        let quoted = config.encoding == Encoding::Json;
        let needed = input.len() * 2 + if quoted { 2 } else { 0 };
        if buf.len() + needed > budget {
            return Outcome::Overflow;
        }

        if quoted {
            buf.push(b'"');
        }
        let start = buf.len();
        buf.resize(start + input.len() * 2, 0);
        if hex::encode_to_slice(input, &mut buf[start..]).is_err() {
            return Outcome::Failed;
        }
        if quoted {
            buf.push(b'"');
        }

        if clamped {
            Outcome::Clamped
        } else {
            Outcome::Written
        }
    })
}

/// Render a value through `fmt`, always as a quoted string
///
/// A panic inside `render` is caught and reported as a failed field.
fn write_rendered(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    budget: usize,
    render: impl FnOnce(&mut TextWriter<'_>) -> fmt::Result,
) -> Outcome {
    let left = budget.saturating_sub(buf.len());
    if left < 2 {
        return Outcome::Overflow;
    }
    let max = config.limits.max_string_len;
    let record_bound = left - 2 < max;

    buf.push(b'"');
    let (written, truncated) = {
        let mut writer = TextWriter::new(buf, Escape::Json, (left - 2).min(max));
        let written = panic::catch_unwind(AssertUnwindSafe(|| render(&mut writer)));
        (written, writer.truncated())
    };
    buf.push(b'"');

    match written {
        Err(_) => Outcome::Failed,
        Ok(_) if truncated && record_bound => Outcome::Overflow,
        Ok(_) if truncated => Outcome::Clamped,
        Ok(Ok(())) => Outcome::Written,
        Ok(Err(_)) => Outcome::Failed,
    }
}

/// Encode an error under the `error` key, followed by its source chain
pub fn encode_err(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    err: &(dyn std::error::Error + 'static),
) -> Result<()> {
    encode_field(buf, config, ERROR_KEY, true, |buf, budget| {
        write_rendered(buf, config, budget, |w| {
            write!(w, "{}", err)?;
            let mut source = err.source();
            while let Some(cause) = source {
                write!(w, ": {}", cause)?;
                source = cause.source();
            }
            Ok(())
        })
    })
}

/// Encode any `Display` value as pre-rendered text
///
/// This is the catch-all for values without a dedicated encoder. Output is
/// escaped and bounded like any string, and a panicking `Display` impl omits
/// the field instead of unwinding into the caller.
pub fn encode_display(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    key: &str,
    value: &dyn fmt::Display,
) -> Result<()> {
    encode_field(buf, config, key, false, |buf, budget| {
        write_rendered(buf, config, budget, |w| write!(w, "{}", value))
    })
}

/// Open the message text; console messages start out quoted
///
/// Returns the budget left for the text itself, or `None` if even the quotes
/// do not fit.
fn open_message(buf: &mut Vec<u8>, config: &EncoderConfig) -> Option<usize> {
    let left = config.limits.field_budget().saturating_sub(buf.len());
    match config.encoding {
        Encoding::Json => Some(left),
        Encoding::Console { .. } => {
            let left = left.checked_sub(2)?;
            buf.push(b'"');
            Some(left)
        }
    }
}

/// Close the message text opened at `mark`
///
/// A console message keeps its quotes unless it is a single plain token, so
/// it can never be mistaken for `key=value` pairs.
fn close_message(buf: &mut Vec<u8>, config: &EncoderConfig, mark: usize) {
    if config.encoding == Encoding::Json {
        return;
    }
    buf.push(b'"');
    let text = &buf[mark + 1..buf.len() - 1];
    if !needs_quotes(text) && !text.contains(&b'\\') {
        buf.pop();
        buf.remove(mark);
    }
}

/// Encode the record message (without key)
///
/// JSON messages are written without their surrounding quotes. Unlike fields,
/// an oversized message is kept in truncated form; both the string limit and
/// the remaining record budget apply.
pub fn encode_message(buf: &mut Vec<u8>, config: &EncoderConfig, message: &[u8]) -> Result<()> {
    let mark = buf.len();
    let Some(left) = open_message(buf, config) else {
        return Err(LoggerError::record_too_large(config.limits.max_record_len));
    };
    let (message, clamped) = clamp(message, config.limits.max_string_len);
    let complete = write_escaped(buf, message, Escape::Json, left);
    close_message(buf, config, mark);

    if !complete {
        return Err(LoggerError::record_too_large(config.limits.max_record_len));
    }
    if clamped {
        return Err(LoggerError::value_truncated(config.limits.max_string_len));
    }
    Ok(())
}

/// Encode a message from format arguments without an intermediate `String`
pub fn encode_message_fmt(
    buf: &mut Vec<u8>,
    config: &EncoderConfig,
    args: fmt::Arguments<'_>,
) -> Result<()> {
    let mark = buf.len();
    let Some(left) = open_message(buf, config) else {
        return Err(LoggerError::record_too_large(config.limits.max_record_len));
    };
    let max = config.limits.max_string_len;
    let (written, truncated) = {
        let mut writer = TextWriter::new(buf, Escape::Json, left.min(max));
        let written = panic::catch_unwind(AssertUnwindSafe(|| fmt::Write::write_fmt(&mut writer, args)));
        (written, writer.truncated())
    };

    let result = match written {
        Ok(_) if truncated && left < max => {
            Err(LoggerError::record_too_large(config.limits.max_record_len))
        }
        Ok(_) if truncated => Err(LoggerError::value_truncated(max)),
        Ok(Ok(())) => Ok(()),
        Err(_) | Ok(Err(_)) => {
            buf.truncate(mark);
            return Err(LoggerError::render("message"));
        }
    };
    close_message(buf, config, mark);
    result
}

/// Encode the per-record timestamp value (without key)
///
/// On failure the buffer is left untouched: a format that cannot be rendered
/// yields [`LoggerError::Render`], a record without room for the timestamp
/// [`LoggerError::RecordTooLarge`].
pub fn encode_record_time(buf: &mut Vec<u8>, config: &EncoderConfig, now: &DateTime<Utc>) -> Result<()> {
    let mark = buf.len();
    let budget = config.limits.field_budget();
    let outcome = match write_time_value(buf, config, now, budget) {
        Outcome::Written if buf.len() > budget => Outcome::Overflow,
        outcome => outcome,
    };
    match outcome {
        Outcome::Written => Ok(()),
        Outcome::Failed => {
            buf.truncate(mark);
            Err(LoggerError::render("time"))
        }
        Outcome::Overflow | Outcome::Clamped => {
            buf.truncate(mark);
            Err(LoggerError::record_too_large(config.limits.max_record_len))
        }
    }
}
