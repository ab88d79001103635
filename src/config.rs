//! Configuration management
//!
//! Logging setup can be described in a TOML file and applied to a
//! `LogContext` in one call. Every section is optional.
//!
//! ```toml
//! [binary]
//! directory = "/var/log/app"
//! level = "verbose"
//!
//! [text]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [domains]
//! sync = "verbose"
//! ws = "warning"
//! ```

use crate::constants::{
    DEFAULT_TEXT_CHANNEL_CAPACITY, DEFAULT_TEXT_FLUSH_INTERVAL_MS, DEFAULT_TEXT_MAX_BYTES,
    DEFAULT_TEXT_MAX_FILES,
};
use crate::error::{LogError, Result};
use crate::logging::{
    ConsoleSink, FileSinkConfig, FileTextSink, LogContext, LogDomain, LogLevel, TextFormat,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

// =============================================================================
// Configuration
// =============================================================================

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub binary: BinaryConfig,
    pub text: TextConfig,
    /// Per-domain thresholds, keyed by native or variant name (case-insensitive)
    pub domains: BTreeMap<String, LogLevel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryConfig {
    /// Rotation file directory (None = platform default)
    pub directory: Option<PathBuf>,
    /// Threshold (None = build default)
    pub level: Option<LogLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub enabled: bool,
    pub level: LogLevel,
    pub format: TextFormat,
    /// Write to this file instead of stderr
    pub file: Option<PathBuf>,
    pub max_bytes: u64,
    pub max_files: usize,
    pub flush_interval_ms: u64,
    pub channel_capacity: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: LogLevel::Info,
            format: TextFormat::Text,
            file: None,
            max_bytes: DEFAULT_TEXT_MAX_BYTES,
            max_files: DEFAULT_TEXT_MAX_FILES,
            flush_interval_ms: DEFAULT_TEXT_FLUSH_INTERVAL_MS,
            channel_capacity: DEFAULT_TEXT_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    /// Per-domain thresholds with keys resolved to domains
    pub fn domain_levels(&self) -> Result<Vec<(LogDomain, LogLevel)>> {
        self.domains
            .iter()
            .map(|(name, level)| {
                name.parse::<LogDomain>()
                    .map(|domain| (domain, *level))
                    .map_err(|reason| LogError::ConfigValidation {
                        field: "domains",
                        reason,
                    })
            })
            .collect()
    }

    /// Apply to `context`.
    ///
    /// Domain names are validated before anything changes. A text sink or
    /// binary directory failure is returned after the rest of the config has
    /// been applied; the first failure wins.
    pub fn apply(&self, context: &LogContext) -> Result<()> {
        let levels = self.domain_levels()?;
        for (domain, level) in levels {
            context.set_level(domain, level);
        }

        if let Some(level) = self.binary.level {
            context.set_binary_log_level(level);
        }

        let text = self.apply_text(context);
        let binary = context.set_binary_log_directory(self.binary.directory.as_deref());
        text.and(binary)
    }

    fn apply_text(&self, context: &LogContext) -> Result<()> {
        if !self.text.enabled {
            context.disable_text_logging();
            return Ok(());
        }
        match &self.text.file {
            Some(path) => {
                let sink = FileTextSink::spawn(FileSinkConfig {
                    path: path.clone(),
                    level: self.text.level,
                    max_bytes: self.text.max_bytes,
                    max_files: self.text.max_files,
                    flush_interval: Duration::from_millis(self.text.flush_interval_ms),
                    channel_capacity: self.text.channel_capacity,
                })
                .map_err(|source| LogError::Io {
                    path: path.clone(),
                    source,
                })?;
                context.enable_text_logging(sink);
            }
            None => {
                context.enable_text_logging(ConsoleSink::stderr(self.text.level, self.text.format));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Load / save
// =============================================================================

/// Load config from `path`, falling back to defaults on any error
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    match load_strict(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}, using defaults", e);
            Config::default()
        }
    }
}

/// Load config from `path`, returning read and parse errors
pub fn load_strict(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|source| LogError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| LogError::ConfigValidation {
        field: "config",
        reason: format!("{}: {}", path.display(), e),
    })
}

/// Save config to `path`
pub fn save(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config).map_err(|e| LogError::ConfigValidation {
        field: "config",
        reason: e.to_string(),
    })?;
    fs::write(path, content).map_err(|source| LogError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
