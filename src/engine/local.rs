//! In-process engine
//!
//! Implements `NativeLogApi` without any foreign library: domains live in a
//! vector (handle = index + 1), levels in atomics, and `emit` drives the
//! registered callback exactly as a native engine thread would.

use super::{CallbackRegistration, DomainHandle, NativeLogApi, UserData};
use crate::logging::LogLevel;
use parking_lot::RwLock;
use std::ffi::CString;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

struct DomainSlot {
    name: String,
    level: AtomicU8,
}

struct CallbackSlot {
    registration: CallbackRegistration,
    level: LogLevel,
}

/// Engine stand-in with real callback semantics
pub struct LocalEngine {
    domains: RwLock<Vec<DomainSlot>>,
    callback: RwLock<Option<CallbackSlot>>,
    /// Number of `get_or_create_domain` calls that created a domain
    created: AtomicUsize,
    /// Number of callback invocations
    delivered: AtomicUsize,
}

impl LocalEngine {
    pub fn new() -> Self {
        Self {
            domains: RwLock::new(Vec::new()),
            callback: RwLock::new(None),
            created: AtomicUsize::new(0),
            delivered: AtomicUsize::new(0),
        }
    }

    /// Emit a message the way an engine thread does.
    ///
    /// The message is dropped if the domain level or the callback level
    /// filters it out. Unknown handles are still delivered (filtered only
    /// by the callback level).
    pub fn emit(&self, handle: DomainHandle, level: LogLevel, message: &str) {
        if let Some(domain_level) = self.level_of(handle) {
            if !level.passes(domain_level) {
                return;
            }
        }

        // Interior NULs would truncate the C string; replace them.
        let text = match CString::new(message) {
            Ok(text) => text,
            Err(_) => match CString::new(message.replace('\0', " ")) {
                Ok(text) => text,
                Err(_) => return,
            },
        };

        // Held across the call so `set_callback(_, None)` waits for in-flight deliveries.
        let guard = self.callback.read_recursive();
        if let Some(slot) = guard.as_ref() {
            if level.passes(slot.level) {
                (slot.registration.callback)(
                    handle,
                    level.to_native(),
                    text.as_ptr(),
                    slot.registration.user_data.as_ptr(),
                );
                self.delivered.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Emit on a domain by name, creating it if needed
    pub fn emit_named(&self, name: &str, level: LogLevel, message: &str) {
        if let Some(handle) = self.get_or_create_domain(name, true) {
            self.emit(handle, level, message);
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.read().len()
    }

    pub fn creations(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn has_callback(&self) -> bool {
        self.callback.read().is_some()
    }

    fn level_of(&self, handle: DomainHandle) -> Option<LogLevel> {
        let index = handle.as_raw().checked_sub(1)?;
        let domains = self.domains.read();
        let slot = domains.get(index)?;
        LogLevel::from_u8(slot.level.load(Ordering::Relaxed))
    }
}

impl Default for LocalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeLogApi for LocalEngine {
    fn get_or_create_domain(&self, name: &str, create: bool) -> Option<DomainHandle> {
        let find = |domains: &[DomainSlot]| {
            domains
                .iter()
                .position(|d| d.name == name)
                .map(|i| DomainHandle::from_raw(i + 1))
        };

        if let Some(handle) = find(&self.domains.read()) {
            return Some(handle);
        }
        if !create {
            return None;
        }

        let mut domains = self.domains.write();
        // Another thread may have created it between the two locks.
        if let Some(handle) = find(&domains) {
            return Some(handle);
        }
        domains.push(DomainSlot {
            name: name.to_string(),
            level: AtomicU8::new(LogLevel::Info.as_u8()),
        });
        self.created.fetch_add(1, Ordering::Relaxed);
        Some(DomainHandle::from_raw(domains.len()))
    }

    fn domain_name(&self, handle: DomainHandle) -> Option<String> {
        let index = handle.as_raw().checked_sub(1)?;
        self.domains.read().get(index).map(|d| d.name.clone())
    }

    fn domain_level(&self, handle: DomainHandle) -> LogLevel {
        self.level_of(handle).unwrap_or_default()
    }

    fn set_domain_level(&self, handle: DomainHandle, level: LogLevel) {
        let Some(index) = handle.as_raw().checked_sub(1) else {
            return;
        };
        if let Some(slot) = self.domains.read().get(index) {
            slot.level.store(level.as_u8(), Ordering::Relaxed);
        }
    }

    fn set_callback(&self, level: LogLevel, registration: Option<CallbackRegistration>) {
        *self.callback.write() = registration.map(|registration| CallbackSlot {
            registration,
            level,
        });
    }

    fn clear_callback(&self, user_data: UserData) -> bool {
        let mut slot = self.callback.write();
        let current = slot
            .as_ref()
            .is_some_and(|s| s.registration.user_data.as_ptr() == user_data.as_ptr());
        if current {
            *slot = None;
        }
        current
    }
}
