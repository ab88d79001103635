//! Log dispatch system
//!
//! Centralizes all log-related types and utilities:
//! - `LogDomain` / `LogLevel` / `LogMessage` - what flows through the bridge
//! - `DomainRegistry` - native domain handles for the closed domain set
//! - `SinkSet` - per-domain sinks, the active text sink, the binary sink
//! - `BinaryLogManager` - binary rotation files
//! - `LogContext` - the whole state, gated startup, and the facade
//! - `dispatch` - the native callback boundary

pub mod binary;
pub mod console;
pub mod context;
pub mod dispatch;
pub mod domain;
pub mod entry;
pub mod file;
pub mod filter;
pub mod gate;
pub mod registry;
pub mod sinks;
pub mod store;

pub use binary::BinaryLogManager;
pub use console::{ConsoleSink, TextFormat};
pub use context::{CallbackGuard, LogContext};
pub use dispatch::native_log_callback;
pub use domain::LogDomain;
pub use entry::{LogLevel, LogMessage};
pub use file::{FileSinkConfig, FileTextSink};
pub use filter::{LevelFilter, MessageFilter};
pub use registry::DomainRegistry;
pub use sinks::{DomainSink, SinkSet, TextSink};
pub use store::MemorySink;

use crate::error::{LogError, Result};
use std::sync::{Arc, OnceLock};

/// Initialize internal tracing for the bridge's own diagnostics
///
/// Call early in main() before any logging occurs.
/// Set `verbose` to true for debug-level output.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(tracing_subscriber::EnvFilter::new(level))
        .try_init();
}

struct Installed {
    context: Arc<LogContext>,
    _guard: CallbackGuard,
}

static GLOBAL: OnceLock<Installed> = OnceLock::new();

/// Make `context` the process-wide logging context and attach its callback.
///
/// Only the first call succeeds; the callback stays registered for the
/// lifetime of the process.
pub fn install(context: LogContext) -> Result<&'static LogContext> {
    let mut installed_now = false;
    let installed = GLOBAL.get_or_init(|| {
        installed_now = true;
        let context = Arc::new(context);
        let guard = context.attach();
        Installed {
            context,
            _guard: guard,
        }
    });
    if !installed_now {
        return Err(LogError::AlreadyInstalled);
    }
    Ok(&installed.context)
}

/// The installed context, if any
pub fn global() -> Option<&'static LogContext> {
    GLOBAL.get().map(|installed| installed.context.as_ref())
}
