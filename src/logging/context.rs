//! Logging context
//!
//! The single object holding all logging state: domain registry, sink set,
//! binary log manager and the initialization gate. The native callback
//! receives a pointer to it as user data; nothing else is ambient.

use super::binary::BinaryLogManager;
use super::gate::InitGate;
use super::registry::DomainRegistry;
use super::sinks::{SinkSet, TextSink};
use super::{LogDomain, LogLevel};
use crate::constants::{APP_NAME, STARTUP_TAG};
use crate::directory::DefaultDirectoryResolver;
use crate::engine::{CallbackRegistration, NativeLogApi, UserData};
use crate::error::Result;
use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct LogContext {
    registry: DomainRegistry,
    sinks: SinkSet,
    gate: InitGate,
    banner: String,
    /// Bumped by every `attach`; only the newest guard may unregister
    attachments: AtomicU64,
}

impl std::fmt::Debug for LogContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogContext")
            .field("gate", &self.gate)
            .field("banner", &self.banner)
            .field("attachments", &self.attachments)
            .finish_non_exhaustive()
    }
}

impl LogContext {
    pub fn new(
        engine: Arc<dyn NativeLogApi>,
        resolver: Arc<dyn DefaultDirectoryResolver>,
    ) -> Self {
        Self::with_binary(engine, BinaryLogManager::new(resolver))
    }

    /// Build around an existing binary manager (custom clock, pre-set level)
    pub fn with_binary(engine: Arc<dyn NativeLogApi>, binary: BinaryLogManager) -> Self {
        Self {
            registry: DomainRegistry::new(engine),
            sinks: SinkSet::new(binary),
            gate: InitGate::new(),
            banner: user_agent(),
            attachments: AtomicU64::new(0),
        }
    }

    /// Sink set, running the one-time startup sequence on first access.
    ///
    /// Startup picks the default binary directory if none was set, then
    /// emits the banner on the `Couchbase` domain at `Info` regardless of
    /// that domain's configured level, restoring the level afterwards.
    pub fn to(&self) -> &SinkSet {
        self.gate.run_once(|| self.startup());
        &self.sinks
    }

    fn startup(&self) {
        let binary = self.sinks.binary();
        if binary.directory().is_none() {
            // Failure is already warned about; startup continues without a binary file.
            let _ = binary.set_directory(None);
        }

        let previous = self.set_level(LogDomain::Couchbase, LogLevel::Info);
        if let Err(e) = self
            .sinks
            .domain(LogDomain::Couchbase)
            .info(STARTUP_TAG, &self.banner)
        {
            debug!("Startup banner not delivered: {}", e);
        }
        self.set_level(LogDomain::Couchbase, previous);
    }

    pub fn is_initialized(&self) -> bool {
        self.gate.is_initialized()
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn banner(&self) -> &str {
        &self.banner
    }

    // =========================================================================
    // Facade
    // =========================================================================

    pub fn enable_text_logging<S: TextSink + 'static>(&self, sink: S) {
        self.sinks.enable_text(sink);
    }

    pub fn disable_text_logging(&self) {
        self.sinks.disable_text();
    }

    /// See [`BinaryLogManager::set_directory`]
    pub fn set_binary_log_directory(&self, directory: Option<&Path>) -> Result<()> {
        self.sinks.binary().set_directory(directory)
    }

    pub fn binary_log_directory(&self) -> Option<PathBuf> {
        self.sinks.binary().directory()
    }

    pub fn binary_log_level(&self) -> LogLevel {
        self.sinks.binary().level()
    }

    pub fn set_binary_log_level(&self, level: LogLevel) {
        self.sinks.binary().set_level(level);
    }

    pub fn level(&self, domain: LogDomain) -> LogLevel {
        self.sinks.domain_sink(domain).level()
    }

    /// Set a domain's threshold here and in the native engine; returns the old one
    pub fn set_level(&self, domain: LogDomain, level: LogLevel) -> LogLevel {
        let previous = self.sinks.domain_sink(domain).set_level(level);
        match self.registry.require(domain) {
            Ok(handle) => self.registry.engine().set_domain_level(handle, level),
            Err(e) => debug!("Level not mirrored to engine: {}", e),
        }
        previous
    }

    // =========================================================================
    // Native callback
    // =========================================================================

    /// Register the dispatch callback with the engine.
    ///
    /// The engine delivers every level; filtering happens in the sinks. The
    /// returned guard keeps the context alive and, on drop, unregisters the
    /// callback unless a later `attach` (on this or another context) has
    /// replaced it.
    pub fn attach(self: &Arc<Self>) -> CallbackGuard {
        let generation = self.attachments.fetch_add(1, Ordering::AcqRel) + 1;
        let registration = CallbackRegistration {
            callback: super::dispatch::native_log_callback,
            user_data: self.user_data(),
        };
        self.registry
            .engine()
            .set_callback(LogLevel::Debug, Some(registration));
        CallbackGuard {
            context: Arc::clone(self),
            generation,
        }
    }

    fn user_data(self: &Arc<Self>) -> UserData {
        UserData::new(Arc::as_ptr(self) as *mut c_void)
    }
}

/// Keeps the dispatch callback registered; unregisters on drop
pub struct CallbackGuard {
    context: Arc<LogContext>,
    generation: u64,
}

impl CallbackGuard {
    pub fn context(&self) -> &Arc<LogContext> {
        &self.context
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        if self.context.attachments.load(Ordering::Acquire) != self.generation {
            return;
        }
        self.context
            .registry
            .engine()
            .clear_callback(self.context.user_data());
    }
}

/// `native-log-bridge/<version> (<os>; <arch>)`
pub fn user_agent() -> String {
    format!(
        "{}/{} ({}; {})",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
