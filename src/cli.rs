//! Command-line interface definition using clap
//!
//! Provides structured argument parsing with automatic help generation.

use clap::{Parser, Subcommand};
use native_log_bridge::logging::{LogLevel, TextFormat};
use std::path::PathBuf;

// =============================================================================
// CLI Definition
// =============================================================================

/// Drive the log bridge with a simulated engine, or decode binary logs
#[derive(Parser, Debug, Default)]
#[command(name = "nlb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Emit messages from several engine threads through the bridge
    Simulate {
        /// Number of emitting threads
        #[arg(short, long, default_value_t = 4)]
        threads: usize,

        /// Messages per thread
        #[arg(short, long, default_value_t = 25)]
        messages: usize,

        /// Binary log directory (overrides config)
        #[arg(long, value_name = "DIR")]
        binary_dir: Option<PathBuf>,

        /// Text sink threshold (overrides config)
        #[arg(long, value_parser = parse_level)]
        level: Option<LogLevel>,

        /// Text sink output format
        #[arg(long, value_parser = parse_format)]
        format: Option<TextFormat>,
    },

    /// Print the records of a binary log file
    Dump {
        /// Binary log file
        file: PathBuf,
    },
}

fn parse_level(raw: &str) -> Result<LogLevel, String> {
    match raw.to_ascii_lowercase().as_str() {
        "none" => Ok(LogLevel::None),
        "error" => Ok(LogLevel::Error),
        "warn" | "warning" => Ok(LogLevel::Warning),
        "info" => Ok(LogLevel::Info),
        "verbose" => Ok(LogLevel::Verbose),
        "debug" => Ok(LogLevel::Debug),
        _ => Err(format!("unknown level '{}'", raw)),
    }
}

fn parse_format(raw: &str) -> Result<TextFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "text" => Ok(TextFormat::Text),
        "json" => Ok(TextFormat::Json),
        _ => Err(format!("unknown format '{}'", raw)),
    }
}

// =============================================================================
// Tests
// =============================================================================
