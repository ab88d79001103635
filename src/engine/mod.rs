//! Native engine interface
//!
//! The engine owns domain handles and per-domain levels, and delivers log
//! events through a C ABI callback registered with `set_callback`. The bridge
//! only consumes this narrow surface; `LocalEngine` is an in-process
//! implementation used by the CLI and tests.

mod local;

pub use local::LocalEngine;

use crate::logging::LogLevel;
use std::ffi::{c_char, c_int, c_void};

/// Opaque native domain handle
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainHandle(usize);

impl DomainHandle {
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }
}

/// Callback signature the engine invokes for each log event
pub type LogCallback = extern "C" fn(
    domain: DomainHandle,
    level: c_int,
    message: *const c_char,
    user_data: *mut c_void,
);

/// Opaque pointer handed back to the callback untouched
#[derive(Debug, Clone, Copy)]
pub struct UserData(*mut c_void);

// The engine never dereferences user data; it only passes it back to the callback.
unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

impl UserData {
    pub fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn null() -> Self {
        Self(std::ptr::null_mut())
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }
}

/// A callback together with its user data
#[derive(Debug, Clone, Copy)]
pub struct CallbackRegistration {
    pub callback: LogCallback,
    pub user_data: UserData,
}

/// Operations the bridge needs from the native engine.
///
/// Implementations must be callable from any thread. `set_callback(_, None)`
/// must not return while a previously registered callback is still running,
/// so callers can free the user data afterwards.
pub trait NativeLogApi: Send + Sync {
    /// Look up a domain by name, creating it when `create` is set.
    ///
    /// Repeated calls with the same name return the same handle.
    fn get_or_create_domain(&self, name: &str, create: bool) -> Option<DomainHandle>;

    /// Name of the domain behind `handle`, if the engine knows it
    fn domain_name(&self, handle: DomainHandle) -> Option<String>;

    fn domain_level(&self, handle: DomainHandle) -> LogLevel;

    fn set_domain_level(&self, handle: DomainHandle, level: LogLevel);

    /// Install (or with `None`, remove) the log callback and its minimum level
    fn set_callback(&self, level: LogLevel, registration: Option<CallbackRegistration>);

    /// Remove the callback only if it is still registered with `user_data`.
    ///
    /// Returns whether a registration was removed. Same waiting guarantee as
    /// `set_callback(_, None)`.
    fn clear_callback(&self, user_data: UserData) -> bool;
}
