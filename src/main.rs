//! Native Log Bridge CLI
//!
//! Usage:
//!   nlb                              Print the resolved logging setup
//!   nlb simulate [--threads N]       Drive the bridge from an in-process engine
//!   nlb dump <FILE>                  Decode a binary rotation file

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use native_log_bridge::config::{self, Config};
use native_log_bridge::directory::PlatformDirectoryResolver;
use native_log_bridge::engine::LocalEngine;
use native_log_bridge::logging::context::user_agent;
use native_log_bridge::logging::{self, binary, BinaryLogManager, LogDomain, LogLevel};
use native_log_bridge::{LogContext, Result};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => config::load(path),
        None => Config::default(),
    };

    match cli.command {
        None => show(&config),
        Some(Command::Dump { file }) => dump(&file),
        Some(Command::Simulate {
            threads,
            messages,
            binary_dir,
            level,
            format,
        }) => {
            if binary_dir.is_some() {
                config.binary.directory = binary_dir;
            }
            if level.is_some() || format.is_some() {
                config.text.enabled = true;
            }
            if let Some(level) = level {
                config.text.level = level;
            }
            if let Some(format) = format {
                config.text.format = format;
            }
            simulate(&config, threads, messages)
        }
    }
}

fn show(config: &Config) -> Result<()> {
    let binary = BinaryLogManager::new(Arc::new(PlatformDirectoryResolver));
    println!("{}", user_agent());
    println!(
        "binary directory: {}",
        config
            .binary
            .directory
            .clone()
            .unwrap_or_else(|| binary.default_directory())
            .display()
    );
    println!(
        "binary level:     {}",
        config.binary.level.unwrap_or_else(LogLevel::default_binary)
    );
    for (domain, level) in config.domain_levels()? {
        println!("{:<16}  {}", domain.native_name(), level);
    }
    Ok(())
}

fn dump(file: &Path) -> Result<()> {
    for record in binary::read_records(file)? {
        println!("{}", record.to_line());
    }
    Ok(())
}

fn simulate(config: &Config, threads: usize, messages: usize) -> Result<()> {
    let engine = Arc::new(LocalEngine::new());
    let context = logging::install(LogContext::new(
        engine.clone(),
        Arc::new(PlatformDirectoryResolver),
    ))?;
    if let Err(e) = config.apply(context) {
        // The bridge keeps routing without the failed part
        warn!("Config partially applied: {}", e);
    }

    let workers: Vec<_> = (0..threads)
        .map(|worker| {
            let engine = engine.clone();
            thread::spawn(move || {
                for n in 0..messages {
                    let domain = LogDomain::ALL[(worker + n) % LogDomain::COUNT];
                    let level = LogLevel::ALL[1 + n % (LogLevel::ALL.len() - 1)];
                    engine.emit_named(
                        domain.native_name(),
                        level,
                        &format!("worker {} message {}", worker, n),
                    );
                }
            })
        })
        .collect();
    for (index, worker) in workers.into_iter().enumerate() {
        if worker.join().is_err() {
            warn!("Simulation worker {} panicked", index);
        }
    }

    // Text sinks flush on release
    context.disable_text_logging();

    let binary = context.to().binary();
    debug!("Engine delivered {} messages", engine.delivered());
    if let Some(file) = binary.current_file() {
        println!("binary log: {}", file.display());
    }
    Ok(())
}
