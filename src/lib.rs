//! Native log bridge
//!
//! Routes log events from a native engine's C callback to pluggable sinks:
//! a per-domain sink table, an optional text sink, and rotating binary
//! diagnostic files. Nothing that goes wrong while routing a message ever
//! unwinds back into the engine.

pub mod config;
pub mod constants;
pub mod directory;
pub mod engine;
pub mod error;
pub mod logging;

pub use error::{LogError, Result};
pub use logging::{LogContext, LogDomain, LogLevel};
