//! Per-operation lazy dispatch.
//!
//! Each public operation owns a [`Dispatcher`]. The first call detects the
//! host capabilities, asks the [`Registry`] for the best compatible Entry,
//! extracts that Entry's function for the operation and caches it. Later
//! calls are a single `OnceCell` load plus an indirect call.
//!
//! ```text
//! Priority  Entry     Requirement   Platform   Lanes (f64)
//! ────────  ────────  ────────────  ─────────  ───────────
//! 20        avx2      AVX2          x86_64     4
//! 15        neon      NEON          aarch64    2
//! 10        sse2      SSE2          x86_64     2
//! 0         generic   (none)        any        1
//! ```
//!
//! Resolution is strict per Entry: if the winning Entry lacks the operation
//! the dispatcher fails with [`DspError::MissingOperation`] instead of
//! falling through to a lower-priority Entry. A missing Entry or slot is a
//! build defect, so the public path ([`Dispatcher::get`]) panics on it.
//!
//! The cached choice is never re-evaluated. Overrides installed through
//! [`dsp_cpu::set_forced_features`] only affect dispatchers that have not
//! resolved yet; tests that need a specific tier build their own
//! dispatcher and call [`Dispatcher::init_with`].

use dsp_core::{DspError, Result};
use dsp_cpu::{detect_features, CpuFeatures, SimdLevel};
use once_cell::sync::OnceCell;

use crate::registry::Registry;
use crate::table::{OpId, Operations};

#[derive(Clone, Copy)]
struct Resolved<F> {
    func: F,
    entry: &'static str,
    level: SimdLevel,
}

/// Lazily resolved function pointer for one operation.
pub struct Dispatcher<F: Copy + 'static> {
    op: OpId,
    select: fn(&Operations) -> Option<F>,
    resolved: OnceCell<Resolved<F>>,
}

impl<F: Copy + 'static> Dispatcher<F> {
    /// Unresolved dispatcher. `select` extracts the operation's slot from an
    /// Entry's function table.
    pub const fn new(op: OpId, select: fn(&Operations) -> Option<F>) -> Self {
        Self {
            op,
            select,
            resolved: OnceCell::new(),
        }
    }

    pub fn op(&self) -> OpId {
        self.op
    }

    /// Cached function, resolving against the global registry and the
    /// current capability snapshot on first use.
    ///
    /// # Panics
    ///
    /// If no Entry is compatible or the selected Entry lacks the operation.
    pub fn get(&self) -> F {
        match self
            .resolved
            .get_or_try_init(|| self.resolve(Registry::global(), &detect_features()))
        {
            Ok(resolved) => resolved.func,
            Err(e) => panic!("vecmath: {e}"),
        }
    }

    /// Resolve against an explicit registry and snapshot without touching
    /// the cache.
    pub fn try_resolve_with(&self, registry: &Registry, features: &CpuFeatures) -> Result<F> {
        self.resolve(registry, features).map(|r| r.func)
    }

    /// Resolve against an explicit registry and snapshot and cache the
    /// result. Returns the selected Entry name; if the dispatcher was
    /// already resolved the cached name is returned unchanged.
    pub fn init_with(&self, registry: &Registry, features: &CpuFeatures) -> Result<&'static str> {
        self.resolved
            .get_or_try_init(|| self.resolve(registry, features))
            .map(|r| r.entry)
    }

    /// [`init_with`](Self::init_with) against the global registry and the
    /// current snapshot: the non-panicking form of [`get`](Self::get).
    pub fn try_init(&self) -> Result<&'static str> {
        self.init_with(Registry::global(), &detect_features())
    }

    /// Name of the Entry this dispatcher resolved to, if it has resolved.
    pub fn selected(&self) -> Option<&'static str> {
        self.resolved.get().map(|r| r.entry)
    }

    /// Tier of the resolved Entry, if resolved.
    pub fn selected_level(&self) -> Option<SimdLevel> {
        self.resolved.get().map(|r| r.level)
    }

    /// Drop the cached resolution. Requires exclusive access, so only
    /// locally owned dispatchers can be reset.
    pub fn reset(&mut self) {
        self.resolved.take();
    }

    fn resolve(&self, registry: &Registry, features: &CpuFeatures) -> Result<Resolved<F>> {
        let op = self.op.name();
        let entry = registry
            .lookup(features)
            .ok_or(DspError::NoImplementation { op })?;
        let func = (self.select)(&entry.ops).ok_or(DspError::MissingOperation {
            entry: entry.name,
            op,
        })?;
        tracing::debug!(
            op,
            entry = entry.name,
            level = %entry.level,
            priority = entry.priority,
            "kernel selected"
        );
        Ok(Resolved {
            func,
            entry: entry.name,
            level: entry.level,
        })
    }
}
