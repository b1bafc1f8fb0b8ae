//! Deployment observers
//!
//! - `console` - Plain-text progress
//! - `json` - NDJSON event stream
//! - `tracing` - Structured log records

mod console;
mod json;
mod tracing;

pub use console::ConsoleObserver;
pub use json::{event_to_json, JsonObserver};
pub use self::tracing::TracingObserver;
