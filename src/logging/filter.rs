//! Log filtering
//!
//! `LevelFilter` is the lock-free threshold shared by every sink.
//! `MessageFilter` adds a domain whitelist for text sinks.

use super::{LogDomain, LogLevel, LogMessage};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};

/// Atomic level threshold
#[derive(Debug)]
pub struct LevelFilter {
    threshold: AtomicU8,
}

impl LevelFilter {
    pub fn new(threshold: LogLevel) -> Self {
        Self {
            threshold: AtomicU8::new(threshold.as_u8()),
        }
    }

    #[inline]
    pub fn get(&self) -> LogLevel {
        LogLevel::from_u8(self.threshold.load(Ordering::Relaxed)).unwrap_or_default()
    }

    #[inline]
    pub fn set(&self, threshold: LogLevel) {
        self.threshold.store(threshold.as_u8(), Ordering::Relaxed);
    }

    /// Set a new threshold, returning the previous one
    pub fn replace(&self, threshold: LogLevel) -> LogLevel {
        LogLevel::from_u8(self.threshold.swap(threshold.as_u8(), Ordering::Relaxed))
            .unwrap_or_default()
    }

    #[inline]
    pub fn allows(&self, level: LogLevel) -> bool {
        level.passes(self.get())
    }
}

/// Text sink filter configuration
#[derive(Debug, Clone)]
pub struct MessageFilter {
    pub level: LogLevel,
    pub domains: HashSet<LogDomain>, // Empty = all allowed
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            domains: HashSet::new(),
        }
    }
}

impl MessageFilter {
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Check if a message passes the filter
    pub fn matches(&self, message: &LogMessage) -> bool {
        if !message.level().passes(self.level) {
            return false;
        }
        // Check domain filter (empty = all allowed)
        self.domains.is_empty() || self.domains.contains(&message.domain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Helper functions ===

    fn make(domain: LogDomain, level: LogLevel) -> LogMessage {
        LogMessage::new(domain, level, "test message")
    }

    // === LevelFilter tests ===

    #[test]
    fn test_level_filter_roundtrip() {
        let filter = LevelFilter::new(LogLevel::Warning);
        assert_eq!(filter.get(), LogLevel::Warning);

        filter.set(LogLevel::Verbose);
        assert_eq!(filter.get(), LogLevel::Verbose);
    }

    #[test]
    fn test_level_filter_replace_returns_previous() {
        let filter = LevelFilter::new(LogLevel::Error);
        assert_eq!(filter.replace(LogLevel::Info), LogLevel::Error);
        assert_eq!(filter.get(), LogLevel::Info);
    }

    #[test]
    fn test_level_filter_allows() {
        let filter = LevelFilter::new(LogLevel::Warning);

        assert!(filter.allows(LogLevel::Error));
        assert!(filter.allows(LogLevel::Warning));
        assert!(!filter.allows(LogLevel::Info));
        assert!(!filter.allows(LogLevel::Debug));
        assert!(!filter.allows(LogLevel::None));
    }

    // === MessageFilter tests ===

    #[test]
    fn test_default_matches_all() {
        let filter = MessageFilter::default();

        for domain in LogDomain::ALL {
            assert!(filter.matches(&make(domain, LogLevel::Debug)));
            assert!(filter.matches(&make(domain, LogLevel::Error)));
        }
    }

    #[test]
    fn test_filter_level() {
        let filter = MessageFilter::with_level(LogLevel::Info);

        assert!(filter.matches(&make(LogDomain::Sync, LogLevel::Info)));
        assert!(!filter.matches(&make(LogDomain::Sync, LogLevel::Verbose)));
    }

    #[test]
    fn test_filter_domains_whitelist() {
        let filter = MessageFilter {
            domains: [LogDomain::Sync, LogDomain::Blip].into_iter().collect(),
            ..Default::default()
        };

        assert!(filter.matches(&make(LogDomain::Sync, LogLevel::Info)));
        assert!(filter.matches(&make(LogDomain::Blip, LogLevel::Info)));
        assert!(!filter.matches(&make(LogDomain::Query, LogLevel::Info)));
    }

    #[test]
    fn test_filter_complex_combination() {
        let filter = MessageFilter {
            level: LogLevel::Warning,
            domains: [LogDomain::Network].into_iter().collect(),
        };

        assert!(filter.matches(&make(LogDomain::Network, LogLevel::Error)));
        assert!(!filter.matches(&make(LogDomain::Network, LogLevel::Info))); // Too verbose
        assert!(!filter.matches(&make(LogDomain::Database, LogLevel::Error))); // Wrong domain
    }
}
