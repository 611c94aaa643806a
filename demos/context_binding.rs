//! Context binding example
//!
//! Demonstrates persistent fields with `with()` and trace correlation with
//! `bind_context`.
//!
//! Run with: cargo run --example context_binding

use rust_event_logger::prelude::*;
use std::thread;

struct Request {
    trace_id: String,
    span_id: String,
}

impl TraceContext for Request {
    fn trace_id(&self) -> Option<&str> {
        Some(&self.trace_id)
    }

    fn span_id(&self) -> Option<&str> {
        Some(&self.span_id)
    }
}

fn handle(logger: &Logger, request: &Request, user: u64) {
    let log = logger.bind_context(request);
    log.info().u64("user", user).msg("request started");
    log.debug().msg("not shown at the default level");
    log.info().u64("user", user).msg("request finished");
}

fn main() -> Result<()> {
    println!("=== Rust Event Logger - Context Binding Example ===\n");

    let root = Logger::json(std::io::stdout());
    let service = root
        .with()
        .str("service", "billing")
        .str("version", env!("CARGO_PKG_VERSION"))
        .logger();

    println!("1. Persistent fields on every record:");
    service.info().msg("service started");

    println!("\n2. Trace context from a standard carrier:");
    let ctx = TracingContext::new("4bf92f3577b34da6a3ce929d0e0e4736", "00f067aa0ba902b7")
        .with_parent("b7ad6b7169203331");
    service.bind_context(&ctx).info().msg("charge accepted");

    println!("\n3. Per-request loggers across threads:");
    thread::scope(|s| {
        for user in 0..3u64 {
            let service = &service;
            s.spawn(move || {
                let request = Request {
                    trace_id: format!("trace-{:04}", user),
                    span_id: format!("span-{:04}", user),
                };
                handle(service, &request, user);
            });
        }
    });

    println!("\n4. Derived loggers keep their own level:");
    let verbose = service.with().str("component", "ledger").logger();
    verbose.set_level(LogLevel::Debug);
    verbose.debug().msg("visible on the derived logger");
    service.debug().msg("still hidden on the parent");

    root.flush()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
