//! Crate-wide constants
//!
//! Centralized constants to avoid duplication and ensure consistency.

// =============================================================================
// Binary log files
// =============================================================================

/// Prefix of every binary rotation file (`log-<unix-epoch-seconds>`)
pub const BINARY_LOG_PREFIX: &str = "log-";

/// Subdirectory appended to the resolver's default directory
pub const DEFAULT_LOGS_SUBDIR: &str = "Logs";

/// Magic bytes written at the start of each binary rotation file
pub const BINARY_LOG_MAGIC: &[u8; 4] = b"NLB1";

/// Longest message text stored in a single binary record (bytes)
pub const MAX_RECORD_TEXT_BYTES: usize = 64 * 1024;

// =============================================================================
// Startup
// =============================================================================

/// Application name used for default directories and the startup banner
pub const APP_NAME: &str = "native-log-bridge";

/// Tag of the one-time startup banner
pub const STARTUP_TAG: &str = "Startup";

// =============================================================================
// Text sinks
// =============================================================================

/// Default ring capacity of the in-memory sink
pub const DEFAULT_MEMORY_CAPACITY: usize = 200;

/// Default size threshold before the text file sink rotates (bytes)
pub const DEFAULT_TEXT_MAX_BYTES: u64 = 4 * 1024 * 1024;

/// Default number of rotated text files kept next to the active one
pub const DEFAULT_TEXT_MAX_FILES: usize = 3;

/// Default flush interval of the text file writer thread (milliseconds)
pub const DEFAULT_TEXT_FLUSH_INTERVAL_MS: u64 = 250;

/// Bounded queue capacity between callers and the text file writer thread
pub const DEFAULT_TEXT_CHANNEL_CAPACITY: usize = 1024;

/// Smallest rotation threshold accepted by the text file sink (bytes)
pub const MIN_TEXT_MAX_BYTES: u64 = 1024;
