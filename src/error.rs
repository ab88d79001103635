//! Centralized error types for the log bridge
//!
//! All bridge errors are represented by the `LogError` enum.
//! Use `Result<T>` as shorthand for `std::result::Result<T, LogError>`.

use std::fmt;
use std::path::PathBuf;

/// All log bridge errors
#[derive(Debug)]
pub enum LogError {
    // === Binary log ===
    /// Failed to create the binary log directory
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to open a binary rotation file
    OpenBinaryLog {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to append to the current binary rotation file
    WriteBinaryLog {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Sinks ===
    /// A text sink rejected a message
    Sink { source: std::io::Error },
    /// A sink panicked while handling a message
    Panicked { message: String },

    // === Native layer ===
    /// The native layer refused to create a domain handle
    DomainUnavailable { name: &'static str },

    // === Config ===
    /// Failed to read or write a config file
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Invalid config value
    ConfigValidation { field: &'static str, reason: String },

    // === Lifecycle ===
    /// A global context was already installed
    AlreadyInstalled,

    // === IO ===
    /// File system operation failed
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. }
            | Self::OpenBinaryLog { source, .. }
            | Self::WriteBinaryLog { source, .. }
            | Self::Sink { source }
            | Self::ConfigRead { source, .. }
            | Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDirectory { path, source } => write!(
                f,
                "Cannot create binary log directory {}: {}",
                path.display(),
                source
            ),
            Self::OpenBinaryLog { path, source } => {
                write!(f, "Cannot open binary log {}: {}", path.display(), source)
            }
            Self::WriteBinaryLog { path, .. } => {
                write!(f, "Cannot write binary log {}", path.display())
            }
            Self::Sink { source } => write!(f, "Text sink failed: {}", source),
            Self::Panicked { message } => write!(f, "Sink panicked: {}", message),
            Self::DomainUnavailable { name } => {
                write!(f, "Native layer has no domain '{}'", name)
            }
            Self::ConfigRead { path, .. } => write!(f, "Cannot read config: {}", path.display()),
            Self::ConfigValidation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            Self::AlreadyInstalled => write!(f, "A logging context is already installed"),
            Self::Io { path, .. } => write!(f, "IO error: {}", path.display()),
        }
    }
}

impl LogError {
    /// Error kind and raw OS code of the underlying io error, if any.
    ///
    /// Used in warnings so operators see the same `domain / code` pair the OS reports.
    pub fn io_code(&self) -> Option<(std::io::ErrorKind, Option<i32>)> {
        match self {
            Self::CreateDirectory { source, .. }
            | Self::OpenBinaryLog { source, .. }
            | Self::WriteBinaryLog { source, .. }
            | Self::Sink { source }
            | Self::ConfigRead { source, .. }
            | Self::Io { source, .. } => Some((source.kind(), source.raw_os_error())),
            _ => None,
        }
    }
}

/// Alias for Result with LogError
pub type Result<T> = std::result::Result<T, LogError>;
