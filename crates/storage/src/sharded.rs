//! Sharded multi-version storage
//!
//! # Design
//!
//! - DashMap: one shard per key [`Space`], so profile traffic never contends
//!   with friendship traffic
//! - FxHashMap: O(1) key lookup inside a shard
//! - VersionChain: every key keeps its entries in ascending version order;
//!   deletes append tombstones instead of removing the key
//!
//! # Visibility
//!
//! A commit appends all of its entries with one version and only then
//! publishes that version. Readers pick their snapshot from the published
//! version, so a half-applied batch is never visible.
//!
//! # Example
//!
//! ```ignore
//! use rapport_storage::ShardedStore;
//!
//! let store = ShardedStore::new();
//! let v = store.next_version();
//! store.apply_batch(&[(key.clone(), value)], &[], v);
//! store.publish(v);
//! assert!(store.get_at(&key, store.version()).is_some());
//! ```

use dashmap::DashMap;
use rapport_core::{Key, Space, Storage, Timestamp, Value, VersionedValue};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// All entries ever written for one key, oldest first
#[derive(Debug, Clone, Default)]
pub struct VersionChain {
    entries: Vec<VersionedValue>,
}

impl VersionChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; versions must be increasing
    pub fn push(&mut self, entry: VersionedValue) {
        debug_assert!(
            self.entries
                .last()
                .map_or(true, |last| last.version < entry.version),
            "version chain must grow monotonically"
        );
        self.entries.push(entry);
    }

    /// Newest entry visible at `snapshot` (tombstones included)
    pub fn at(&self, snapshot: u64) -> Option<&VersionedValue> {
        self.entries.iter().rev().find(|e| e.version <= snapshot)
    }

    /// Newest entry regardless of snapshot
    pub fn latest(&self) -> Option<&VersionedValue> {
        self.entries.last()
    }

    /// Number of entries (live and tombstone)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was ever written
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries no snapshot at or after `min_snapshot` can observe.
    ///
    /// Keeps the newest entry with `version <= min_snapshot` and everything
    /// newer. Returns the number of entries removed.
    pub fn prune(&mut self, min_snapshot: u64) -> usize {
        let keep_from = self
            .entries
            .iter()
            .rposition(|e| e.version <= min_snapshot)
            .unwrap_or(0);
        self.entries.drain(..keep_from).count()
    }

    /// True if the chain is a single tombstone every snapshot can see.
    ///
    /// Such a chain reads as "absent" at every live snapshot and can go.
    pub fn is_dead(&self, min_snapshot: u64) -> bool {
        matches!(self.entries.as_slice(), [only] if only.is_tombstone() && only.version <= min_snapshot)
    }
}

/// Per-space shard
///
/// Each space gets its own FxHashMap so scans stay inside one map.
#[derive(Debug)]
pub struct Shard {
    pub(crate) data: FxHashMap<Key, VersionChain>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self {
            data: FxHashMap::default(),
        }
    }

    /// Create a shard with pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Number of keys in this shard (including deleted keys not yet collected)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for Shard {
    fn default() -> Self {
        Self::new()
    }
}

/// Sharded multi-version store - DashMap by Space, FxHashMap within
///
/// # Thread Safety
///
/// All operations are thread-safe. Writers are expected to be serialized by
/// the engine's commit lock; readers never block on it.
pub struct ShardedStore {
    shards: DashMap<Space, Shard>,
    /// Last published commit version
    version: AtomicU64,
    /// Last allocated commit version
    allocated: AtomicU64,
    shard_capacity: usize,
}

impl ShardedStore {
    /// Create new sharded store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with expected number of keys per space
    pub fn with_capacity(shard_capacity: usize) -> Self {
        Self {
            shards: DashMap::with_capacity(Space::ALL.len()),
            version: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
            shard_capacity,
        }
    }

    /// Last published version (the newest snapshot readers may use)
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Allocate the next commit version
    #[inline]
    pub fn next_version(&self) -> u64 {
        self.allocated.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Make every entry up to `version` visible to new snapshots
    #[inline]
    pub fn publish(&self, version: u64) {
        self.version.fetch_max(version, Ordering::AcqRel);
    }

    /// Number of non-empty shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total keys across all shards
    pub fn total_entries(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Keys stored in one space
    pub fn space_entry_count(&self, space: Space) -> usize {
        self.shards.get(&space).map(|shard| shard.len()).unwrap_or(0)
    }

    // ========================================================================
    // Snapshot reads
    // ========================================================================

    /// Live value of `key` at `snapshot`
    ///
    /// Returns None if the key did not exist or was deleted at that snapshot.
    #[inline]
    pub fn get_at(&self, key: &Key, snapshot: u64) -> Option<VersionedValue> {
        self.shards.get(&key.space).and_then(|shard| {
            shard
                .data
                .get(key)
                .and_then(|chain| chain.at(snapshot))
                .filter(|entry| !entry.is_tombstone())
                .cloned()
        })
    }

    /// Check if a key is live at `snapshot`
    #[inline]
    pub fn contains_at(&self, key: &Key, snapshot: u64) -> bool {
        self.get_at(key, snapshot).is_some()
    }

    /// All live entries under `prefix` at `snapshot`, sorted by key
    pub fn scan_prefix_at(&self, prefix: &Key, snapshot: u64) -> Vec<(Key, VersionedValue)> {
        let mut results: Vec<(Key, VersionedValue)> = match self.shards.get(&prefix.space) {
            Some(shard) => shard
                .data
                .iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .filter_map(|(key, chain)| {
                    chain
                        .at(snapshot)
                        .filter(|entry| !entry.is_tombstone())
                        .map(|entry| (key.clone(), entry.clone()))
                })
                .collect(),
            None => Vec::new(),
        };
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Apply a batch of writes and deletes with one version
    ///
    /// Entries are appended to their chains but stay invisible until
    /// [`publish`](Self::publish) is called with `version`. Deleting a key
    /// that was never written is a no-op.
    pub fn apply_batch(&self, writes: &[(Key, Value)], deletes: &[Key], version: u64) {
        let timestamp = Timestamp::now();

        for (key, value) in writes {
            self.shards
                .entry(key.space)
                .or_insert_with(|| Shard::with_capacity(self.shard_capacity))
                .data
                .entry(key.clone())
                .or_default()
                .push(VersionedValue::live(value.clone(), version, timestamp));
        }

        for key in deletes {
            if let Some(mut shard) = self.shards.get_mut(&key.space) {
                if let Some(chain) = shard.data.get_mut(key) {
                    chain.push(VersionedValue::tombstone(version, timestamp));
                }
            }
        }
    }

    /// Prune version chains below `min_snapshot`
    ///
    /// `min_snapshot` must not exceed the oldest snapshot still in use.
    /// Returns the number of entries removed.
    pub fn gc(&self, min_snapshot: u64) -> usize {
        let mut removed = 0;
        for mut shard in self.shards.iter_mut() {
            shard.data.retain(|_, chain| {
                removed += chain.prune(min_snapshot);
                if chain.is_dead(min_snapshot) {
                    removed += chain.len();
                    false
                } else {
                    true
                }
            });
        }
        if removed > 0 {
            tracing::debug!(min_snapshot, removed, "pruned version chains");
        }
        removed
    }
}

impl Storage for ShardedStore {
    fn current_version(&self, key: &Key) -> u64 {
        self.shards
            .get(&key.space)
            .and_then(|shard| {
                shard
                    .data
                    .get(key)
                    .and_then(|chain| chain.latest())
                    .filter(|entry| !entry.is_tombstone())
                    .map(|entry| entry.version)
            })
            .unwrap_or(0)
    }

    fn changed_since(&self, prefix: &Key, version: u64) -> Option<Key> {
        let shard = self.shards.get(&prefix.space)?;
        let changed = shard
            .data
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .find(|(_, chain)| chain.latest().map_or(false, |e| e.version > version))
            .map(|(key, _)| key.clone());
        changed
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedStore")
            .field("shard_count", &self.shard_count())
            .field("version", &self.version())
            .field("total_entries", &self.total_entries())
            .finish()
    }
}
