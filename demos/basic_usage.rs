//! Basic logger usage example
//!
//! Demonstrates level gating, typed fields and the console and JSON handlers.
//!
//! Run with: cargo run --example basic_usage

use rust_event_logger::prelude::*;
use rust_event_logger::{info, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Basic Usage Example ===\n");

    // Human-readable output on stdout
    let console = Logger::builder()
        .handler(ConsoleHandler::stdout())
        .level(LogLevel::Trace)
        .timestamp(TimestampFormat::Iso8601)
        .build();

    println!("1. Logging at different levels:");
    console.trace().msg("This is a trace message");
    console.debug().msg("This is a debug message");
    console.info().msg("This is an info message");
    console.warn().msg("This is a warning message");
    console.error().msg("This is an error message");

    println!("\n2. Typed fields:");
    console
        .info()
        .str("user", "john")
        .i64("id", 42)
        .f64("ratio", 0.75)
        .bool("admin", false)
        .duration("took", Duration::from_millis(12))
        .hex("etag", &[0xde, 0xad, 0xbe, 0xef])
        .msg("login");

    println!("\n3. Minimum level set to WARN - info and below are skipped:");
    console.set_level(LogLevel::Warn);
    console.info().msg("Info message (hidden)");
    console.warn().msg("Warning message (visible)");

    println!("\n4. JSON records with an error callback:");
    let mut json = Logger::json(io::stdout());
    json.set_error_callback(Arc::new(|err: &LoggerError| {
        eprintln!("logger reported: {}", err);
    }));
    json.info().str("method", "GET").u64("status", 200).msg("request served");
    json.info().str("", "rejected").msg("empty keys are dropped and reported");
    json.warn()
        .str("input", "line one\n{\"level\":\"error\"}")
        .msg("control characters stay escaped");

    println!("\n5. Formatting macros:");
    let attempt = 3;
    info!(json, "connected after {} attempts", attempt);
    warn!(json, "disk usage at {}%", 91);

    json.flush()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
