//! Property-based tests for rust_event_logger using proptest

use proptest::prelude::*;
use rust_event_logger::prelude::*;
use rust_event_logger::Limits;
use std::sync::Arc;

fn level_strategy() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
    ]
}

fn quiet_json(sink: &MemorySink) -> Logger {
    Logger::builder()
        .handler(JsonHandler::new(sink.clone()))
        .level(LogLevel::Trace)
        .on_error(Arc::new(|_: &LoggerError| {}))
        .build()
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in level_strategy()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        let parsed: LogLevel = level.as_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Test that gating follows level ordering
    #[test]
    fn test_gating_follows_ordering(threshold in level_strategy(), level in level_strategy()) {
        let logger = quiet_json(&MemorySink::new());
        logger.set_level(threshold);
        prop_assert_eq!(logger.is_enabled(level), level >= threshold);
        prop_assert!(logger.is_enabled(LogLevel::Fatal));
    }
}

// ============================================================================
// Encoding Tests
// ============================================================================

proptest! {
    /// Any UTF-8 string survives as key, value and message in valid JSON
    #[test]
    fn test_string_roundtrip(key in "k_[a-z_]{0,15}", value in any::<String>(), message in any::<String>()) {
        let sink = MemorySink::new();
        let logger = quiet_json(&sink);
        logger.info().str(&key, &value).msg(&message);

        let lines = sink.lines();
        prop_assert_eq!(lines.len(), 1);
        let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        prop_assert_eq!(record["message"].as_str(), Some(message.as_str()));
        prop_assert_eq!(record[key.as_str()].as_str(), Some(value.as_str()));
    }

    /// Arbitrary bytes in keys, values and messages never panic and always
    /// yield exactly one valid UTF-8 JSON line
    #[test]
    fn test_arbitrary_bytes_never_corrupt(
        key in proptest::collection::vec(any::<u8>(), 0..300),
        value in proptest::collection::vec(any::<u8>(), 0..512),
        message in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let sink = MemorySink::new();
        let logger = quiet_json(&sink);
        let key = String::from_utf8_lossy(&key).into_owned();
        logger.warn().str_lossy(&key, &value).msg_lossy(&message);

        let contents = sink.contents();
        prop_assert!(std::str::from_utf8(&contents).is_ok());
        prop_assert_eq!(contents.iter().filter(|&&b| b == b'\n').count(), 1);
        let record: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        prop_assert!(record["message"].is_string());
    }

    /// Keys are accepted exactly when non-blank and at most 256 bytes
    #[test]
    fn test_key_rule(key in "[ a-z]{0,300}") {
        prop_assume!(key != "level" && key != "message");
        let sink = MemorySink::new();
        let logger = quiet_json(&sink);
        logger.info().bool(&key, true).msg("t");

        let record: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        let accepted = !key.trim().is_empty() && key.len() <= 256;
        prop_assert_eq!(record.get(key.as_str()).is_some(), accepted);
        prop_assert_eq!(logger.metrics().fields_rejected(), u64::from(!accepted));
        prop_assert_eq!(record["message"].as_str(), Some("t"));
    }

    /// Finite floats roundtrip through the JSON output
    #[test]
    fn test_finite_float_roundtrip(value in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let sink = MemorySink::new();
        let logger = quiet_json(&sink);
        logger.info().f64("v", value).send();

        let line = sink.lines().remove(0);
        let token = line
            .split("\"v\":")
            .nth(1)
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap();
        prop_assert_eq!(token.parse::<f64>().unwrap(), value);
        prop_assert!(serde_json::from_str::<serde_json::Value>(&line).is_ok());
    }

    /// Integers roundtrip exactly
    #[test]
    fn test_integer_roundtrip(signed in any::<i64>(), unsigned in any::<u64>()) {
        let sink = MemorySink::new();
        let logger = quiet_json(&sink);
        logger.info().i64("s", signed).u64("u", unsigned).send();

        let record: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        prop_assert_eq!(record["s"].as_i64(), Some(signed));
        prop_assert_eq!(record["u"].as_u64(), Some(unsigned));
    }

    /// No record exceeds the configured ceiling, whatever is appended
    #[test]
    fn test_record_ceiling(
        max_record_len in 256usize..4096,
        values in proptest::collection::vec(".{0,600}", 0..40),
        message in ".{0,2000}",
    ) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .handler(JsonHandler::new(sink.clone()))
            .limits(Limits { max_record_len, ..Limits::default() })
            .on_error(Arc::new(|_: &LoggerError| {}))
            .build();

        let mut event = logger.error();
        for (i, value) in values.iter().enumerate() {
            event = event.str(&format!("field_{}", i), value);
        }
        event.msg(&message);

        let contents = sink.contents();
        prop_assert!(contents.len() <= max_record_len, "{} > {}", contents.len(), max_record_len);
        let record: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
        prop_assert_eq!(record["level"].as_str(), Some("error"));
    }
}

// ============================================================================
// Console Tests
// ============================================================================

#[cfg(feature = "console")]
proptest! {
    /// Console records stay on one line whatever the input
    #[test]
    fn test_console_single_line(key in any::<String>(), value in any::<String>(), message in any::<String>()) {
        let sink = MemorySink::new();
        let logger = Logger::builder()
            .handler(ConsoleHandler::new(sink.clone()).with_colors(false))
            .on_error(Arc::new(|_: &LoggerError| {}))
            .build();
        logger.info().str(&key, &value).msg(&message);

        let contents = sink.contents();
        prop_assert!(std::str::from_utf8(&contents).is_ok());
        prop_assert_eq!(contents.iter().filter(|&&b| b == b'\n' || b == b'\r').count(), 1);
        prop_assert!(contents.starts_with(b"INFO "));
    }
}
