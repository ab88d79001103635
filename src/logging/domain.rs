//! Logical log domains
//!
//! The closed catalogue of categories the native engine logs under. Each
//! domain has a fixed native name used when asking the engine for a handle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical category of a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogDomain {
    /// Messages from the library layer itself (startup banner, host code)
    Couchbase = 0,
    Database = 1,
    Query = 2,
    Sync = 3,
    Network = 4,
    /// Engine core; also the fallback for unknown domains
    LiteCore = 5,
    Blip = 6,
    WebSocket = 7,
    SyncBusy = 8,
}

impl LogDomain {
    pub const COUNT: usize = 9;

    pub const ALL: [LogDomain; Self::COUNT] = [
        LogDomain::Couchbase,
        LogDomain::Database,
        LogDomain::Query,
        LogDomain::Sync,
        LogDomain::Network,
        LogDomain::LiteCore,
        LogDomain::Blip,
        LogDomain::WebSocket,
        LogDomain::SyncBusy,
    ];

    /// Domain whose sink receives messages from unresolvable handles
    pub const FALLBACK: LogDomain = LogDomain::LiteCore;

    /// Name registered with the native engine
    pub fn native_name(self) -> &'static str {
        match self {
            LogDomain::Couchbase => "Couchbase",
            LogDomain::Database => "DB",
            LogDomain::Query => "Query",
            LogDomain::Sync => "Sync",
            LogDomain::Network => "Network",
            LogDomain::LiteCore => "LiteCore",
            LogDomain::Blip => "BLIP",
            LogDomain::WebSocket => "WS",
            LogDomain::SyncBusy => "SyncBusy",
        }
    }

    /// Exact match on the native name
    pub fn from_native_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.native_name() == name)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

impl fmt::Display for LogDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

/// Parses either the native name (`"WS"`) or the variant name (`"websocket"`),
/// case-insensitively. Used for config keys.
impl FromStr for LogDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| {
                d.native_name().eq_ignore_ascii_case(s)
                    || format!("{:?}", d).eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| format!("unknown log domain '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position() {
        for (i, domain) in LogDomain::ALL.iter().enumerate() {
            assert_eq!(domain.index(), i);
            assert_eq!(LogDomain::from_u8(i as u8), Some(*domain));
        }
        assert_eq!(LogDomain::from_u8(LogDomain::COUNT as u8), None);
    }

    #[test]
    fn test_native_names_unique() {
        let mut names: Vec<_> = LogDomain::ALL.iter().map(|d| d.native_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), LogDomain::COUNT);
    }

    #[test]
    fn test_from_native_name() {
        assert_eq!(LogDomain::from_native_name("WS"), Some(LogDomain::WebSocket));
        assert_eq!(LogDomain::from_native_name("BLIP"), Some(LogDomain::Blip));
        assert_eq!(LogDomain::from_native_name("ws"), None);
        assert_eq!(LogDomain::from_native_name("SQL"), None);
    }

    #[test]
    fn test_from_str_accepts_both_spellings() {
        assert_eq!("ws".parse::<LogDomain>(), Ok(LogDomain::WebSocket));
        assert_eq!("websocket".parse::<LogDomain>(), Ok(LogDomain::WebSocket));
        assert_eq!("db".parse::<LogDomain>(), Ok(LogDomain::Database));
        assert_eq!("Database".parse::<LogDomain>(), Ok(LogDomain::Database));
        assert!("nope".parse::<LogDomain>().is_err());
    }
}
