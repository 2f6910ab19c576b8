//! Observability module
//!
//! Logging infrastructure. The core only emits `tracing` events; the binary
//! decides where they go.

pub mod logging;

pub use logging::{LogFormat, init_logging};
