//! Dispatcher
//!
//! Entry point for log events arriving from the native engine. `route` does
//! the work and may fail; `dispatch` and `native_log_callback` are the
//! boundary: nothing returned or raised below them reaches the engine.

use super::context::LogContext;
use super::LogLevel;
use crate::engine::DomainHandle;
use crate::error::{LogError, Result};
use std::any::Any;
use std::ffi::{c_char, c_int, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

impl LogContext {
    /// Resolve the emitting domain, pick its sink (or the fallback) and deliver.
    pub fn route(&self, handle: DomainHandle, level: LogLevel, text: &str) -> Result<()> {
        let domain = self.registry().domain_of(handle);
        let sinks = self.to();
        sinks.deliver(sinks.matching(domain), level, text)
    }

    /// `route`, with every error and panic downgraded to a warning.
    pub fn dispatch(&self, handle: DomainHandle, level: LogLevel, text: &str) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.route(handle, level, text)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => report(&err),
            Err(payload) => report(&LogError::Panicked {
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

/// C ABI callback registered with the engine by [`LogContext::attach`].
///
/// `user_data` must be the pointer `attach` registered. Null message or user
/// data drops the event.
pub extern "C" fn native_log_callback(
    domain: DomainHandle,
    level: c_int,
    message: *const c_char,
    user_data: *mut c_void,
) {
    let _ = panic::catch_unwind(|| {
        if message.is_null() || user_data.is_null() {
            return;
        }
        // SAFETY: `attach` registered a pointer to a context kept alive by its
        // guard, and the engine unregisters before the guard releases it.
        let context = unsafe { &*(user_data as *const LogContext) };
        // SAFETY: the engine passes a NUL-terminated string valid for the call.
        let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
        context.dispatch(domain, LogLevel::from_native(level), &text);
    });
}

/// Best-effort warning; if even that panics, the failure is dropped.
fn report(err: &LogError) {
    let _ = panic::catch_unwind(AssertUnwindSafe(|| {
        warn!("Log message dropped: {}", err);
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
