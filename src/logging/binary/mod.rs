//! Binary log manager
//!
//! Owns the binary log directory and the single open rotation file.
//! Every directory change opens a fresh `log-<unix-epoch-seconds>` file.
//! Failures never propagate into the dispatch path: they are warned about,
//! binary logging is switched off, and the caller of `set_directory` gets the
//! error back.

pub mod record;

pub use record::{read_records, BinaryRecord};

use crate::constants::{BINARY_LOG_MAGIC, BINARY_LOG_PREFIX, DEFAULT_LOGS_SUBDIR};
use crate::directory::DefaultDirectoryResolver;
use crate::error::{LogError, Result};
use crate::logging::{LogLevel, LogMessage};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of "now" for rotation file names
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Name of the rotation file opened at `now`
pub fn rotation_file_name(now: DateTime<Utc>) -> String {
    format!("{}{}", BINARY_LOG_PREFIX, now.timestamp())
}

/// An open rotation file
struct BinaryLogFile {
    path: PathBuf,
    writer: BufWriter<File>,
    scratch: Vec<u8>,
}

impl BinaryLogFile {
    fn open(path: PathBuf) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let empty = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
        let mut writer = BufWriter::new(file);
        if empty {
            writer.write_all(BINARY_LOG_MAGIC)?;
            writer.flush()?;
        }
        Ok(Self {
            path,
            writer,
            scratch: Vec::with_capacity(256),
        })
    }

    fn append(&mut self, message: &LogMessage) -> io::Result<()> {
        self.scratch.clear();
        record::encode(message, &mut self.scratch);
        self.writer.write_all(&self.scratch)?;
        self.writer.flush()
    }

    fn close(mut self) {
        if let Err(e) = self.writer.flush() {
            debug!("Flushing {} on close failed: {}", self.path.display(), e);
        }
    }
}

struct BinaryLogState {
    directory: Option<PathBuf>,
    file: Option<BinaryLogFile>,
    level: LogLevel,
    /// Rotation files opened since creation
    rotations: u64,
}

/// Binary sink: directory lifecycle plus the current rotation file
pub struct BinaryLogManager {
    state: Mutex<BinaryLogState>,
    resolver: Arc<dyn DefaultDirectoryResolver>,
    clock: Clock,
}

impl BinaryLogManager {
    pub fn new(resolver: Arc<dyn DefaultDirectoryResolver>) -> Self {
        Self::with_clock(resolver, Box::new(Utc::now))
    }

    pub fn with_clock(resolver: Arc<dyn DefaultDirectoryResolver>, clock: Clock) -> Self {
        Self {
            state: Mutex::new(BinaryLogState {
                directory: None,
                file: None,
                level: LogLevel::default_binary(),
                rotations: 0,
            }),
            resolver,
            clock,
        }
    }

    /// `<resolver default>/Logs`
    pub fn default_directory(&self) -> PathBuf {
        self.resolver.default_directory().join(DEFAULT_LOGS_SUBDIR)
    }

    /// Point binary logging at `directory` (`None` = default directory).
    ///
    /// Setting the directory that is already active does nothing. Otherwise
    /// the directory is created, a new rotation file opened, and only then is
    /// the previous file closed. On failure binary logging is disabled until
    /// the next call; the directory is not remembered, so retrying the same
    /// path attempts creation again.
    pub fn set_directory(&self, directory: Option<&Path>) -> Result<()> {
        let target = match directory {
            Some(dir) => dir.to_path_buf(),
            None => self.default_directory(),
        };

        let mut state = self.state.lock();
        if state.directory.as_deref() == Some(target.as_path()) && state.file.is_some() {
            return Ok(());
        }

        if let Err(source) = fs::create_dir_all(&target) {
            let previous = Self::disable(&mut state);
            drop(state);
            if let Some(file) = previous {
                file.close();
            }
            let err = LogError::CreateDirectory {
                path: target,
                source,
            };
            warn!("Failed to create binary logging directory: {}", err);
            return Err(err);
        }

        let path = target.join(rotation_file_name((self.clock)()));
        match BinaryLogFile::open(path.clone()) {
            Ok(file) => {
                let previous = state.file.replace(file);
                state.directory = Some(target);
                state.rotations += 1;
                drop(state);
                if let Some(file) = previous {
                    file.close();
                }
                debug!("Binary logging to {}", path.display());
                Ok(())
            }
            Err(source) => {
                let previous = Self::disable(&mut state);
                drop(state);
                if let Some(file) = previous {
                    file.close();
                }
                let err = LogError::OpenBinaryLog { path, source };
                let (kind, code) = err.io_code().unwrap_or((io::ErrorKind::Other, None));
                warn!(
                    "Failed to initialize binary logging file: {} (error {:?} / {:?})",
                    err, kind, code
                );
                Err(err)
            }
        }
    }

    fn disable(state: &mut BinaryLogState) -> Option<BinaryLogFile> {
        state.directory = None;
        state.file.take()
    }

    /// Currently active directory (`None` when binary logging is off)
    pub fn directory(&self) -> Option<PathBuf> {
        self.state.lock().directory.clone()
    }

    /// Path of the open rotation file
    pub fn current_file(&self) -> Option<PathBuf> {
        self.state.lock().file.as_ref().map(|f| f.path.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().file.is_some()
    }

    pub fn level(&self) -> LogLevel {
        self.state.lock().level
    }

    pub fn set_level(&self, level: LogLevel) {
        self.state.lock().level = level;
    }

    /// Number of rotation files opened so far
    pub fn rotations(&self) -> u64 {
        self.state.lock().rotations
    }

    /// Append `message` if binary logging is on and the level passes.
    ///
    /// A write failure closes the file; the next `set_directory` reopens one.
    pub fn write(&self, message: &LogMessage) -> Result<()> {
        let mut state = self.state.lock();
        if !message.level().passes(state.level) {
            return Ok(());
        }
        let Some(file) = state.file.as_mut() else {
            return Ok(());
        };

        match file.append(message) {
            Ok(()) => Ok(()),
            Err(source) => {
                let path = file.path.clone();
                let previous = Self::disable(&mut state);
                drop(state);
                drop(previous);
                Err(LogError::WriteBinaryLog { path, source })
            }
        }
    }

    /// Flush and close the rotation file, keeping nothing open
    pub fn close(&self) {
        let previous = Self::disable(&mut self.state.lock());
        if let Some(file) = previous {
            file.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::FixedDirectoryResolver;
    use crate::logging::LogDomain;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};
    use tempfile::TempDir;

    fn fixed_clock(secs: i64) -> Clock {
        Box::new(move || Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn ticking_clock(start: i64) -> Clock {
        let next = AtomicI64::new(start);
        Box::new(move || Utc.timestamp_opt(next.fetch_add(1, Ordering::SeqCst), 0).unwrap())
    }

    fn manager(root: &Path, clock: Clock) -> BinaryLogManager {
        BinaryLogManager::with_clock(Arc::new(FixedDirectoryResolver::new(root)), clock)
    }

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_rotation_file_name() {
        let now = Utc.timestamp_opt(1_700_000_000, 999).unwrap();
        assert_eq!(rotation_file_name(now), "log-1700000000");
    }

    #[test]
    fn test_set_directory_creates_stamped_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        let manager = manager(tmp.path(), fixed_clock(1_700_000_000));

        manager.set_directory(Some(&dir)).unwrap();

        assert_eq!(manager.directory(), Some(dir.clone()));
        assert_eq!(manager.current_file(), Some(dir.join("log-1700000000")));
        assert_eq!(files_in(&dir), vec!["log-1700000000".to_string()]);
    }

    #[test]
    fn test_same_directory_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        let manager = manager(tmp.path(), ticking_clock(1_000));

        manager.set_directory(Some(&dir)).unwrap();
        manager.set_directory(Some(&dir)).unwrap();

        assert_eq!(manager.rotations(), 1);
        assert_eq!(files_in(&dir), vec!["log-1000".to_string()]);
    }

    #[test]
    fn test_new_directory_rotates() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        let manager = manager(tmp.path(), ticking_clock(2_000));

        manager.set_directory(Some(&a)).unwrap();
        manager.set_directory(Some(&b)).unwrap();

        assert_eq!(manager.rotations(), 2);
        assert_eq!(manager.current_file(), Some(b.join("log-2001")));
        assert!(a.join("log-2000").exists());
    }

    #[test]
    fn test_none_uses_default_directory() {
        let tmp = TempDir::new().unwrap();
        let manager = manager(tmp.path(), fixed_clock(5));

        manager.set_directory(None).unwrap();
        let expected = tmp.path().join(DEFAULT_LOGS_SUBDIR);
        assert_eq!(manager.directory(), Some(expected.clone()));

        // None again resolves to the same directory: no new file
        manager.set_directory(None).unwrap();
        assert_eq!(manager.rotations(), 1);
    }

    #[test]
    fn test_create_failure_disables_and_recovers() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good");
        // A regular file where a directory component is expected
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let bad = blocker.join("logs");
        let manager = manager(tmp.path(), ticking_clock(10));

        manager.set_directory(Some(&good)).unwrap();
        let err = manager.set_directory(Some(&bad)).unwrap_err();
        assert!(matches!(err, LogError::CreateDirectory { .. }));
        assert!(!manager.is_enabled());
        assert_eq!(manager.directory(), None);

        // Writes are silently skipped while disabled
        let msg = LogMessage::new(LogDomain::Sync, LogLevel::Error, "lost");
        manager.write(&msg).unwrap();

        // Reconfiguring re-enables
        manager.set_directory(Some(&good)).unwrap();
        assert!(manager.is_enabled());
    }

    #[test]
    fn test_open_failure_disables() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good");
        let taken = tmp.path().join("taken");
        // A directory already sits where the rotation file should go
        fs::create_dir_all(taken.join("log-5")).unwrap();
        let manager = manager(tmp.path(), fixed_clock(5));

        manager.set_directory(Some(&good)).unwrap();
        let err = manager.set_directory(Some(&taken)).unwrap_err();

        match err {
            LogError::OpenBinaryLog { path, .. } => assert_eq!(path, taken.join("log-5")),
            other => panic!("Expected OpenBinaryLog, got {:?}", other),
        }
        assert!(!manager.is_enabled());
        assert_eq!(manager.directory(), None);
        assert_eq!(manager.current_file(), None);
        assert_eq!(manager.rotations(), 1);
    }

    #[test]
    fn test_write_failure_closes_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        let manager = manager(tmp.path(), fixed_clock(9));
        manager.set_directory(Some(&dir)).unwrap();
        manager.set_level(LogLevel::Debug);

        // Swap in a read-only handle so the next append fails
        let path = dir.join("log-9");
        manager.state.lock().file = Some(BinaryLogFile {
            path: path.clone(),
            writer: BufWriter::new(File::open(&path).unwrap()),
            scratch: Vec::new(),
        });

        let msg = LogMessage::new(LogDomain::Network, LogLevel::Error, "unreachable");
        match manager.write(&msg).unwrap_err() {
            LogError::WriteBinaryLog { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("Expected WriteBinaryLog, got {:?}", other),
        }
        assert!(!manager.is_enabled());
        assert_eq!(manager.directory(), None);

        // Disabled: later writes are skipped, reconfiguring reopens
        manager.write(&msg).unwrap();
        manager.set_directory(Some(&dir)).unwrap();
        assert!(manager.is_enabled());
        manager.write(&msg).unwrap();
        let records = record::read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "unreachable");
    }

    #[test]
    fn test_write_respects_level_and_appends() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("logs");
        let manager = manager(tmp.path(), fixed_clock(42));
        manager.set_directory(Some(&dir)).unwrap();
        manager.set_level(LogLevel::Info);

        manager
            .write(&LogMessage::new(LogDomain::Sync, LogLevel::Info, "connected"))
            .unwrap();
        manager
            .write(&LogMessage::new(LogDomain::Sync, LogLevel::Debug, "noise"))
            .unwrap();

        let records = record::read_records(&dir.join("log-42")).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "connected");
        assert_eq!(records[0].domain, LogDomain::Sync);
    }

    #[test]
    fn test_reopen_same_second_appends_after_header() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let manager = manager(tmp.path(), fixed_clock(7));

        manager.set_directory(Some(&a)).unwrap();
        manager
            .write(&LogMessage::new(LogDomain::Query, LogLevel::Error, "one"))
            .unwrap();
        manager.close();
        manager.set_directory(Some(&a)).unwrap();
        manager
            .write(&LogMessage::new(LogDomain::Query, LogLevel::Error, "two"))
            .unwrap();

        let records = record::read_records(&a.join("log-7")).unwrap();
        let texts: Vec<_> = records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_default_level_is_build_dependent() {
        let tmp = TempDir::new().unwrap();
        let manager = manager(tmp.path(), fixed_clock(1));
        assert_eq!(manager.level(), LogLevel::default_binary());
    }
}
