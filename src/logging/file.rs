//! Rotating text file sink.
//!
//! Dispatch runs on engine threads and must not block on disk, so the sink is:
//! - a bounded queue (non-blocking `try_send`, overflow is counted and dropped)
//! - a dedicated thread with buffered writes and periodic flush
//!
//! `release` closes the queue and joins the thread, so everything accepted
//! before the release is on disk when it returns.

use super::sinks::TextSink;
use super::{LogLevel, LogMessage};
use crate::constants::{
    DEFAULT_TEXT_CHANNEL_CAPACITY, DEFAULT_TEXT_FLUSH_INTERVAL_MS, DEFAULT_TEXT_MAX_BYTES,
    DEFAULT_TEXT_MAX_FILES, MIN_TEXT_MAX_BYTES,
};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    pub path: PathBuf,
    pub level: LogLevel,
    pub max_bytes: u64,
    pub max_files: usize,
    pub flush_interval: Duration,
    pub channel_capacity: usize,
}

impl FileSinkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            level: LogLevel::Debug,
            max_bytes: DEFAULT_TEXT_MAX_BYTES,
            max_files: DEFAULT_TEXT_MAX_FILES,
            flush_interval: Duration::from_millis(DEFAULT_TEXT_FLUSH_INTERVAL_MS),
            channel_capacity: DEFAULT_TEXT_CHANNEL_CAPACITY,
        }
    }
}

pub struct FileTextSink {
    tx: Mutex<Option<SyncSender<String>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    level: LogLevel,
    dropped: AtomicU64,
}

impl FileTextSink {
    pub fn spawn(cfg: FileSinkConfig) -> io::Result<Self> {
        if let Some(parent) = cfg.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let (file, size) = open_append(&cfg.path)?;
        let (tx, rx) = sync_channel::<String>(cfg.channel_capacity.max(1));
        let level = cfg.level;

        let worker = thread::Builder::new()
            .name("nlb-text-file".to_string())
            .spawn(move || run_writer(rx, cfg, file, size))?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            level,
            dropped: AtomicU64::new(0),
        })
    }

    /// Lines discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl TextSink for FileTextSink {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn write(&self, message: &LogMessage) -> io::Result<()> {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "file sink released"));
        };
        match tx.try_send(message.to_line()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "file writer thread stopped",
            )),
        }
    }

    fn release(&self) {
        // Dropping the sender lets the writer drain, flush, and exit.
        drop(self.tx.lock().take());
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl Drop for FileTextSink {
    fn drop(&mut self) {
        self.release();
    }
}

fn run_writer(rx: Receiver<String>, cfg: FileSinkConfig, file: File, start_size: u64) {
    let max_bytes = cfg.max_bytes.max(MIN_TEXT_MAX_BYTES);
    let max_files = cfg.max_files.max(1);
    let flush_interval = if cfg.flush_interval.is_zero() {
        Duration::from_millis(DEFAULT_TEXT_FLUSH_INTERVAL_MS)
    } else {
        cfg.flush_interval
    };

    let mut writer = BufWriter::new(file);
    let mut size = start_size;
    let mut dirty = false;
    let mut last_flush = Instant::now();

    loop {
        match rx.recv_timeout(flush_interval) {
            Ok(line) => {
                if write_line(&mut writer, &line).is_ok() {
                    size = size.saturating_add(line.len() as u64 + 1);
                    dirty = true;
                }

                if size >= max_bytes {
                    let _ = writer.flush();
                    drop(writer);
                    let _ = rotate_files(&cfg.path, max_files);
                    match open_truncate(&cfg.path) {
                        Ok(f) => {
                            writer = BufWriter::new(f);
                            size = 0;
                            dirty = false;
                            last_flush = Instant::now();
                        }
                        Err(_) => {
                            // If we cannot reopen the file, stop logging.
                            break;
                        }
                    }
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                if dirty && last_flush.elapsed() >= flush_interval {
                    let _ = writer.flush();
                    dirty = false;
                    last_flush = Instant::now();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                let _ = writer.flush();
                break;
            }
        }
    }
}

fn write_line(writer: &mut BufWriter<File>, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata().map(|m| m.len()).unwrap_or(0);
    Ok((file, size))
}

fn open_truncate(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

/// Shift `name.N-1 -> name.N`, ..., `name -> name.1`, dropping the oldest
fn rotate_files(path: &Path, max_files: usize) -> io::Result<()> {
    if max_files == 0 {
        return Ok(());
    }

    let stem = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "text.log".to_string());
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let oldest = dir.join(format!("{}.{}", stem, max_files));
    let _ = fs::remove_file(&oldest);

    for i in (1..max_files).rev() {
        let src = dir.join(format!("{}.{}", stem, i));
        let dst = dir.join(format!("{}.{}", stem, i + 1));
        if src.exists() {
            let _ = fs::rename(&src, &dst);
        }
    }

    let first = dir.join(format!("{}.1", stem));
    if path.exists() {
        let _ = fs::rename(path, first);
    }

    Ok(())
}
