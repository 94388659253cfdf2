//! Capability registry and resolver.
//!
//! Kernel variants contribute an [`Entry`] to the [`KERNELS`] distributed
//! slice at link time. [`Registry::global`] is built from that slice on
//! first access; later `register` calls append to it. `lookup` returns the
//! highest-priority Entry whose tier the snapshot supports.
//!
//! Entries are sorted lazily: `register` marks the list unsorted, and the
//! next `lookup` performs one stable descending sort under the write lock.
//! Every other `lookup` takes only the read lock. Equal priorities keep
//! registration order.

use std::cmp::Reverse;
use std::sync::{PoisonError, RwLock};

use dsp_cpu::{supports, CpuFeatures};
use linkme::distributed_slice;
use once_cell::sync::Lazy;

use crate::table::Entry;

/// Link-time collection of every built-in kernel variant.
#[distributed_slice]
pub static KERNELS: [Entry];

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::with_builtin_kernels);

#[derive(Default)]
struct RegistryState {
    entries: Vec<Entry>,
    sorted: bool,
}

/// Thread-safe, insertion-ordered collection of kernel Entries.
#[derive(Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every Entry in [`KERNELS`], in slice order.
    pub fn with_builtin_kernels() -> Self {
        let registry = Self::new();
        for entry in KERNELS.iter() {
            registry.register(*entry);
        }
        registry
    }

    /// Process-wide registry used by the public operation functions.
    pub fn global() -> &'static Registry {
        &GLOBAL_REGISTRY
    }

    /// Append an Entry.
    pub fn register(&self, entry: Entry) {
        tracing::trace!(
            name = entry.name,
            level = %entry.level,
            priority = entry.priority,
            "registering kernel variant"
        );
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.push(entry);
        state.sorted = false;
    }

    /// Highest-priority Entry compatible with `features`.
    ///
    /// `None` only when no baseline Entry was ever registered.
    pub fn lookup(&self, features: &CpuFeatures) -> Option<Entry> {
        self.ensure_sorted();
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .entries
            .iter()
            .find(|entry| supports(features, entry.level))
            .copied()
    }

    fn ensure_sorted(&self) {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.sorted {
                return;
            }
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have sorted while we waited for the write lock.
        if !state.sorted {
            state.entries.sort_by_key(|entry| Reverse(entry.priority));
            state.sorted = true;
        }
    }

    /// Copy of the registered Entries, for introspection and tests.
    ///
    /// Priority order once a `lookup` has run since the last `register`,
    /// registration order otherwise.
    pub fn list_entries(&self) -> Vec<Entry> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.entries.clone()
    }

    /// Entries in the order `lookup` scans them.
    pub fn entries_by_priority(&self) -> Vec<Entry> {
        self.ensure_sorted();
        self.list_entries()
    }

    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every Entry (test utility).
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.entries.clear();
        state.sorted = false;
    }
}
