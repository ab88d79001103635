//! Domain handle registry
//!
//! Sole writer of the domain-handle cache. Each logical domain gets its own
//! `OnceLock`, so first use of different domains never contends, and two
//! racing first uses of the same domain settle on one canonical handle.

use super::LogDomain;
use crate::engine::{DomainHandle, NativeLogApi};
use crate::error::{LogError, Result};
use std::sync::{Arc, OnceLock};

pub struct DomainRegistry {
    engine: Arc<dyn NativeLogApi>,
    handles: [OnceLock<DomainHandle>; LogDomain::COUNT],
}

impl DomainRegistry {
    pub fn new(engine: Arc<dyn NativeLogApi>) -> Self {
        Self {
            engine,
            handles: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Handle for `domain`, asking the engine to create it on first use.
    ///
    /// Returns `None` only if the engine refuses to create the domain.
    pub fn resolve(&self, domain: LogDomain) -> Option<DomainHandle> {
        let cell = &self.handles[domain.index()];
        if let Some(handle) = cell.get() {
            return Some(*handle);
        }
        let handle = self
            .engine
            .get_or_create_domain(domain.native_name(), true)?;
        Some(*cell.get_or_init(|| handle))
    }

    /// `resolve`, with a refusal reported as `DomainUnavailable`
    pub fn require(&self, domain: LogDomain) -> Result<DomainHandle> {
        self.resolve(domain).ok_or(LogError::DomainUnavailable {
            name: domain.native_name(),
        })
    }

    /// Cached handle, without touching the engine
    pub fn cached(&self, domain: LogDomain) -> Option<DomainHandle> {
        self.handles[domain.index()].get().copied()
    }

    /// Logical domain behind `handle`, if it belongs to the catalogue
    pub fn domain_of(&self, handle: DomainHandle) -> Option<LogDomain> {
        if let Some(domain) = LogDomain::ALL
            .into_iter()
            .find(|d| self.cached(*d) == Some(handle))
        {
            return Some(domain);
        }

        // The engine may have created the domain itself before we asked.
        let name = self.engine.domain_name(handle)?;
        let domain = LogDomain::from_native_name(&name)?;
        let canonical = *self.handles[domain.index()].get_or_init(|| handle);
        (canonical == handle).then_some(domain)
    }

    /// Native name of `handle`, including domains outside the catalogue
    pub fn name_of(&self, handle: DomainHandle) -> Option<String> {
        match self.domain_of(handle) {
            Some(domain) => Some(domain.native_name().to_string()),
            None => self.engine.domain_name(handle),
        }
    }

    pub fn engine(&self) -> &Arc<dyn NativeLogApi> {
        &self.engine
    }
}
