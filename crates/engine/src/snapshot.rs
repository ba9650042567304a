//! Active snapshot tracking
//!
//! Every transaction pins the published version it reads at. GC may only
//! prune entries that no pinned snapshot can still see.
//!
//! Registration reads the published version and records it under one lock,
//! and the GC horizon is computed under the same lock. A snapshot taken
//! concurrently with GC is therefore either counted in the horizon or newer
//! than it.

use parking_lot::Mutex;
use rapport_storage::ShardedStore;
use std::collections::BTreeMap;

/// Reference-counted set of snapshot versions in use
#[derive(Debug, Default)]
pub struct SnapshotRegistry {
    active: Mutex<BTreeMap<u64, usize>>,
}

impl SnapshotRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the store's current published version
    pub fn register<'a>(&'a self, store: &ShardedStore) -> SnapshotGuard<'a> {
        let mut active = self.active.lock();
        let version = store.version();
        *active.entry(version).or_insert(0) += 1;
        SnapshotGuard {
            registry: self,
            version,
        }
    }

    fn release(&self, version: u64) {
        let mut active = self.active.lock();
        if let Some(count) = active.get_mut(&version) {
            *count -= 1;
            if *count == 0 {
                active.remove(&version);
            }
        }
    }

    /// Oldest version GC must preserve
    ///
    /// The oldest pinned snapshot, or `published` if none is pinned.
    pub fn horizon(&self, published: u64) -> u64 {
        let active = self.active.lock();
        active
            .keys()
            .next()
            .copied()
            .map_or(published, |oldest| oldest.min(published))
    }

    /// Number of transactions currently holding a snapshot
    pub fn active_count(&self) -> usize {
        self.active.lock().values().sum()
    }
}

/// Pins a snapshot until dropped
#[derive(Debug)]
pub struct SnapshotGuard<'a> {
    registry: &'a SnapshotRegistry,
    version: u64,
}

impl SnapshotGuard<'_> {
    /// The pinned version
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Drop for SnapshotGuard<'_> {
    fn drop(&mut self) {
        self.registry.release(self.version);
    }
}
