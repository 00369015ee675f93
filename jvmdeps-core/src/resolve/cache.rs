// jvmdeps-core/src/resolve/cache.rs
// Bounded cache of successful package resolutions shared by a whole run.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};

use jvmdeps_common::label::Label;
use jvmdeps_common::naming::PackageName;
use tracing::debug;

pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct LruState {
    entries: HashMap<PackageName, (Label, u64)>,
    // tick -> key, oldest first
    recency: BTreeMap<u64, PackageName>,
    tick: u64,
}

impl LruState {
    fn touch(&mut self, pkg: &PackageName) -> Option<Label> {
        self.tick += 1;
        let tick = self.tick;
        let (label, last_used) = self.entries.get_mut(pkg)?;
        self.recency.remove(&*last_used);
        *last_used = tick;
        self.recency.insert(tick, pkg.clone());
        Some(label.clone())
    }
}

/// Only successes are stored: a package nobody provides yet may be declared by
/// a rule generated later in the run.
#[derive(Debug)]
pub struct ResolutionCache {
    capacity: usize,
    state: Mutex<LruState>,
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(LruState::default()),
        }
    }

    pub fn get(&self, pkg: &PackageName) -> Option<Label> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.touch(pkg)
    }

    pub fn insert(&self, pkg: PackageName, label: Label) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.touch(&pkg).is_some() {
            if let Some(entry) = state.entries.get_mut(&pkg) {
                entry.0 = label;
            }
            return;
        }

        let tick = state.tick;
        state.recency.insert(tick, pkg.clone());
        state.entries.insert(pkg, (label, tick));

        while state.entries.len() > self.capacity {
            let Some((_, evicted)) = state.recency.pop_first() else {
                break;
            };
            debug!("Evicting {} from resolution cache", evicted);
            state.entries.remove(&evicted);
        }
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
