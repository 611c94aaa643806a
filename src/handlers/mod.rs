//! Handler implementations

#[cfg(feature = "console")]
pub mod console;
pub mod json;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleHandler;
pub use json::JsonHandler;
pub use memory::MemorySink;

pub use crate::core::Handler;
