//! Sink set
//!
//! One built-in `DomainSink` per logical domain, at most one active text
//! sink, and the binary log manager. A message accepted by a domain sink fans
//! out to the text sink and the binary file, each applying its own threshold.

use super::binary::BinaryLogManager;
use super::filter::LevelFilter;
use super::{LogDomain, LogLevel, LogMessage};
use crate::error::{LogError, Result};
use parking_lot::RwLock;
use std::io;
use std::sync::Arc;

/// A pluggable text destination (console, file, memory, ...).
///
/// `write` may be called from many threads at once. `release` is invoked
/// exactly once when the sink is replaced or disabled, after which no more
/// writes arrive.
pub trait TextSink: Send + Sync {
    /// Most verbose level this sink wants
    fn level(&self) -> LogLevel {
        LogLevel::Debug
    }

    fn write(&self, message: &LogMessage) -> io::Result<()>;

    fn release(&self) {}
}

impl<T: TextSink + ?Sized> TextSink for Arc<T> {
    fn level(&self) -> LogLevel {
        (**self).level()
    }

    fn write(&self, message: &LogMessage) -> io::Result<()> {
        (**self).write(message)
    }

    fn release(&self) {
        (**self).release()
    }
}

/// Built-in sink for one logical domain
#[derive(Debug)]
pub struct DomainSink {
    domain: LogDomain,
    filter: LevelFilter,
}

impl DomainSink {
    fn new(domain: LogDomain) -> Self {
        Self {
            domain,
            filter: LevelFilter::new(LogLevel::Info),
        }
    }

    pub fn domain(&self) -> LogDomain {
        self.domain
    }

    pub fn level(&self) -> LogLevel {
        self.filter.get()
    }

    pub(crate) fn set_level(&self, level: LogLevel) -> LogLevel {
        self.filter.replace(level)
    }

    pub fn allows(&self, level: LogLevel) -> bool {
        self.filter.allows(level)
    }
}

/// Every sink the dispatcher can reach
pub struct SinkSet {
    domains: [DomainSink; LogDomain::COUNT],
    text: RwLock<Option<Box<dyn TextSink>>>,
    binary: BinaryLogManager,
}

impl SinkSet {
    pub fn new(binary: BinaryLogManager) -> Self {
        Self {
            domains: LogDomain::ALL.map(DomainSink::new),
            text: RwLock::new(None),
            binary,
        }
    }

    // === Text sink ===

    /// Install `sink`, releasing the previous one after the swap
    pub fn enable_text<S: TextSink + 'static>(&self, sink: S) {
        let previous = self.text.write().replace(Box::new(sink));
        if let Some(previous) = previous {
            previous.release();
        }
    }

    /// Remove and release the active text sink; no-op if there is none
    pub fn disable_text(&self) {
        let previous = self.text.write().take();
        if let Some(previous) = previous {
            previous.release();
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.read().is_some()
    }

    fn write_text(&self, message: &LogMessage) -> Result<()> {
        // Recursive read: a sink that logs through the bridge re-enters here.
        let guard = self.text.read_recursive();
        match guard.as_deref() {
            Some(sink) if message.level().passes(sink.level()) => {
                sink.write(message).map_err(|source| LogError::Sink { source })
            }
            _ => Ok(()),
        }
    }

    // === Binary sink ===

    pub fn binary(&self) -> &BinaryLogManager {
        &self.binary
    }

    // === Domain sinks ===

    pub fn domain_sink(&self, domain: LogDomain) -> &DomainSink {
        &self.domains[domain.index()]
    }

    /// Sink for `domain`, or the fallback sink when the domain is unknown
    pub fn matching(&self, domain: Option<LogDomain>) -> &DomainSink {
        self.domain_sink(domain.unwrap_or(LogDomain::FALLBACK))
    }

    pub fn all(&self) -> &[DomainSink] {
        &self.domains
    }

    /// Writer with tagged per-level helpers for `domain`
    pub fn domain(&self, domain: LogDomain) -> DomainWriter<'_> {
        DomainWriter {
            sink: self.domain_sink(domain),
            set: self,
        }
    }

    /// Filter through `sink`, then fan out to binary and text.
    ///
    /// Both destinations are attempted; the first failure is returned.
    pub fn deliver(&self, sink: &DomainSink, level: LogLevel, text: &str) -> Result<()> {
        if !sink.allows(level) {
            return Ok(());
        }
        let message = LogMessage::new(sink.domain, level, text);
        let binary = self.binary.write(&message);
        let text = self.write_text(&message);
        binary.and(text)
    }
}

/// Tagged logging helpers bound to one domain sink
pub struct DomainWriter<'a> {
    sink: &'a DomainSink,
    set: &'a SinkSet,
}

impl DomainWriter<'_> {
    pub fn write(&self, level: LogLevel, text: &str) -> Result<()> {
        self.set.deliver(self.sink, level, text)
    }

    fn tagged(&self, level: LogLevel, tag: &str, message: &str) -> Result<()> {
        if !self.sink.allows(level) {
            return Ok(());
        }
        self.write(level, &format!("[{}] {}", tag, message))
    }

    pub fn error(&self, tag: &str, message: &str) -> Result<()> {
        self.tagged(LogLevel::Error, tag, message)
    }

    pub fn warn(&self, tag: &str, message: &str) -> Result<()> {
        self.tagged(LogLevel::Warning, tag, message)
    }

    pub fn info(&self, tag: &str, message: &str) -> Result<()> {
        self.tagged(LogLevel::Info, tag, message)
    }

    pub fn verbose(&self, tag: &str, message: &str) -> Result<()> {
        self.tagged(LogLevel::Verbose, tag, message)
    }

    pub fn debug(&self, tag: &str, message: &str) -> Result<()> {
        self.tagged(LogLevel::Debug, tag, message)
    }
}
