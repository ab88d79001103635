//! In-memory text sink
//!
//! Bounded ring buffer of recent messages with filtering and text export.

use super::filter::MessageFilter;
use crate::constants::DEFAULT_MEMORY_CAPACITY;
use super::sinks::TextSink;
use super::{LogLevel, LogMessage};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// Ring buffer sink.
///
/// - **Automatic rotation**: Old entries are dropped when capacity is reached
/// - **Filtering**: By level and domain, applied on write
/// - **Export**: Format stored messages as plain text
pub struct MemorySink {
    entries: Mutex<VecDeque<LogMessage>>,
    max_entries: usize,
    filter: MessageFilter,
    released: AtomicBool,
}

impl MemorySink {
    /// Create a sink keeping at most `max_entries` messages
    pub fn new(max_entries: usize) -> Self {
        Self::with_filter(max_entries, MessageFilter::default())
    }

    pub fn with_filter(max_entries: usize, filter: MessageFilter) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(max_entries)),
            max_entries,
            filter,
            released: AtomicBool::new(false),
        }
    }

    // === Log addition ===

    /// Add a message, rotating out the oldest if at capacity
    fn add(&self, message: LogMessage) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(message);
    }

    /// Clear all stored messages
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    // === Data access ===

    /// Snapshot of stored messages, oldest first
    pub fn entries(&self) -> Vec<LogMessage> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// True once the sink set has released this sink
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    // === Export ===

    /// Format all stored messages as text
    pub fn to_text(&self) -> String {
        self.entries
            .lock()
            .iter()
            .map(LogMessage::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format stored messages as text, limited to max entries (most recent)
    pub fn to_text_limited(&self, max: usize) -> String {
        let entries = self.entries.lock();
        let start = entries.len().saturating_sub(max);

        entries
            .iter()
            .skip(start)
            .map(LogMessage::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CAPACITY)
    }
}

impl TextSink for MemorySink {
    fn level(&self) -> LogLevel {
        self.filter.level
    }

    fn write(&self, message: &LogMessage) -> io::Result<()> {
        if self.filter.matches(message) {
            self.add(message.clone());
        }
        Ok(())
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogDomain;

    fn make(msg: &str) -> LogMessage {
        LogMessage::new(LogDomain::Couchbase, LogLevel::Info, msg)
    }

    #[test]
    fn test_add_rotates_when_full() {
        let sink = MemorySink::new(3);
        for text in ["1", "2", "3", "4"] {
            sink.write(&make(text)).unwrap();
        }
        assert_eq!(sink.len(), 3);

        // First entry should be "2" now (1 was rotated out)
        assert_eq!(sink.entries()[0].text(), "2");
    }

    #[test]
    fn test_default_capacity() {
        let sink = MemorySink::default();
        for i in 0..DEFAULT_MEMORY_CAPACITY + 5 {
            sink.write(&make(&i.to_string())).unwrap();
        }
        assert_eq!(sink.len(), DEFAULT_MEMORY_CAPACITY);
        assert_eq!(sink.entries()[0].text(), "5");
    }

    #[test]
    fn test_filter_applied_on_write() {
        let sink = MemorySink::with_filter(
            10,
            MessageFilter {
                domains: [LogDomain::Sync].into_iter().collect(),
                ..Default::default()
            },
        );
        sink.write(&make("other domain")).unwrap();
        sink.write(&LogMessage::new(LogDomain::Sync, LogLevel::Info, "kept"))
            .unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.entries()[0].text(), "kept");
    }

    #[test]
    fn test_to_text_formatting() {
        let sink = MemorySink::new(10);
        sink.write(&make("Hello")).unwrap();

        let text = sink.to_text();
        assert!(text.contains("[INFO]"));
        assert!(text.contains("Couchbase: Hello"));
    }

    #[test]
    fn test_to_text_limited() {
        let sink = MemorySink::new(10);
        for text in ["1", "2", "3"] {
            sink.write(&make(text)).unwrap();
        }

        let text = sink.to_text_limited(2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        // Should have the last 2 entries
        assert!(lines[0].ends_with("2"));
        assert!(lines[1].ends_with("3"));
    }

    #[test]
    fn test_clear_and_release() {
        let sink = MemorySink::new(10);
        sink.write(&make("1")).unwrap();
        sink.clear();
        assert!(sink.is_empty());

        assert!(!sink.is_released());
        sink.release();
        assert!(sink.is_released());
    }
}
