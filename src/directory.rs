//! Default directory resolution
//!
//! The binary log manager falls back to `<default directory>/Logs` when no
//! directory is configured. Where that default lives is platform policy and
//! is supplied through `DefaultDirectoryResolver`.

use crate::constants::APP_NAME;
use std::path::{Path, PathBuf};

pub trait DefaultDirectoryResolver: Send + Sync {
    fn default_directory(&self) -> PathBuf;
}

/// Per-user local data directory, e.g. `~/.local/share/native-log-bridge`.
///
/// Falls back to the system temp directory when the platform has none.
#[derive(Debug, Clone, Default)]
pub struct PlatformDirectoryResolver;

impl DefaultDirectoryResolver for PlatformDirectoryResolver {
    fn default_directory(&self) -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_NAME)
    }
}

/// Always resolves to the same directory
#[derive(Debug, Clone)]
pub struct FixedDirectoryResolver {
    root: PathBuf,
}

impl FixedDirectoryResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl DefaultDirectoryResolver for FixedDirectoryResolver {
    fn default_directory(&self) -> PathBuf {
        self.root.clone()
    }
}
