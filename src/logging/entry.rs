//! Log entry types
//!
//! Core types for representing messages flowing from the native engine to sinks.

use super::LogDomain;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::c_int;
use std::fmt;

/// Verbosity of a message, or threshold of a sink.
///
/// Ordered from least to most verbose. A sink configured at threshold `T`
/// emits a message at level `L` iff `L != None && L <= T`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warning = 2,
    #[default]
    Info = 3,
    Verbose = 4,
    Debug = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::None,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Verbose,
        LogLevel::Debug,
    ];

    /// True if a message at this level gets through a sink set to `threshold`
    #[inline]
    pub fn passes(self, threshold: LogLevel) -> bool {
        self != LogLevel::None && self <= threshold
    }

    /// Decode the native engine's level (`Debug = 0` .. `Error = 4`, `None = 5`).
    ///
    /// Values outside the native range decode as `Debug`.
    pub fn from_native(raw: c_int) -> Self {
        match raw {
            1 => LogLevel::Verbose,
            2 => LogLevel::Info,
            3 => LogLevel::Warning,
            4 => LogLevel::Error,
            5 => LogLevel::None,
            _ => LogLevel::Debug,
        }
    }

    /// Encode for the native engine
    pub fn to_native(self) -> c_int {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Verbose => 1,
            LogLevel::Info => 2,
            LogLevel::Warning => 3,
            LogLevel::Error => 4,
            LogLevel::None => 5,
        }
    }

    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Default threshold for binary rotation files: everything in debug builds,
    /// everything but `Debug` in release builds.
    pub fn default_binary() -> Self {
        if cfg!(debug_assertions) {
            LogLevel::Debug
        } else {
            LogLevel::Verbose
        }
    }

    /// Short uppercase label used in text output
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Verbose => "VERBOSE",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single routed message.
///
/// Only the dispatcher and the built-in domain sinks create these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    domain: LogDomain,
    level: LogLevel,
    text: String,
    timestamp: DateTime<Utc>,
}

impl LogMessage {
    pub(crate) fn new(domain: LogDomain, level: LogLevel, text: impl Into<String>) -> Self {
        Self::at(domain, level, text, Utc::now())
    }

    pub(crate) fn at(
        domain: LogDomain,
        level: LogLevel,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            domain,
            level,
            text: text.into(),
            timestamp,
        }
    }

    pub fn domain(&self) -> LogDomain {
        self.domain
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Format as one line of plain text: `HH:MM:SS.mmm [LEVEL] Domain: text`
    pub fn to_line(&self) -> String {
        format!(
            "{} [{}] {}: {}",
            self.timestamp.with_timezone(&Local).format("%H:%M:%S%.3f"),
            self.level.label(),
            self.domain.native_name(),
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::None < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Verbose);
        assert!(LogLevel::Verbose < LogLevel::Debug);
    }

    #[test]
    fn test_passes_warning_threshold() {
        let threshold = LogLevel::Warning;
        assert!(LogLevel::Error.passes(threshold));
        assert!(LogLevel::Warning.passes(threshold));
        assert!(!LogLevel::Info.passes(threshold));
        assert!(!LogLevel::Debug.passes(threshold));
    }

    #[test]
    fn test_none_never_passes() {
        for threshold in LogLevel::ALL {
            assert!(!LogLevel::None.passes(threshold));
        }
        // Threshold None silences everything
        assert!(!LogLevel::Error.passes(LogLevel::None));
    }

    #[test]
    fn test_native_out_of_range_is_debug() {
        assert_eq!(LogLevel::from_native(-3), LogLevel::Debug);
        assert_eq!(LogLevel::from_native(5), LogLevel::None);
        assert_eq!(LogLevel::from_native(7), LogLevel::Debug);
        assert_eq!(LogLevel::from_native(42), LogLevel::Debug);
    }

    #[test]
    fn test_default_binary_level_matches_build() {
        #[cfg(debug_assertions)]
        assert_eq!(LogLevel::default_binary(), LogLevel::Debug);
        #[cfg(not(debug_assertions))]
        assert_eq!(LogLevel::default_binary(), LogLevel::Verbose);
    }

    #[test]
    fn test_to_line_contains_parts() {
        let msg = LogMessage::new(LogDomain::Sync, LogLevel::Info, "connected");
        let line = msg.to_line();
        assert!(line.contains("[INFO]"));
        assert!(line.contains("Sync: connected"));
    }

    #[test]
    fn test_level_serde_lowercase() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            level: LogLevel,
        }

        let text = toml::to_string(&Wrapper {
            level: LogLevel::Verbose,
        })
        .unwrap();
        assert!(text.contains("level = \"verbose\""));

        let parsed: Wrapper = toml::from_str("level = \"warning\"").unwrap();
        assert_eq!(parsed.level, LogLevel::Warning);
    }

    proptest! {
        #[test]
        fn native_encoding_is_stable(level in prop::sample::select(LogLevel::ALL.to_vec())) {
            prop_assert_eq!(LogLevel::from_native(level.to_native()), level);
        }

        #[test]
        fn passes_is_monotonic_in_threshold(
            level in prop::sample::select(LogLevel::ALL.to_vec()),
            a in prop::sample::select(LogLevel::ALL.to_vec()),
            b in prop::sample::select(LogLevel::ALL.to_vec()),
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            if level.passes(low) {
                prop_assert!(level.passes(high));
            }
        }

        #[test]
        fn native_order_is_reversed(a in 0i32..=5, b in 0i32..=5) {
            // Native numbering grows with severity; ours grows with verbosity.
            let (la, lb) = (LogLevel::from_native(a), LogLevel::from_native(b));
            if a < b && b < 5 {
                prop_assert!(la > lb);
            }
        }
    }
}
