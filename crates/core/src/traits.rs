//! Storage read interface used by commit validation

use crate::types::Key;

/// Version lookups against the latest committed state.
///
/// Validation runs under the commit lock and compares what a transaction
/// observed with what is there now, so these methods ignore snapshots.
pub trait Storage {
    /// Version of the newest entry for `key` if it is live.
    ///
    /// Returns 0 if the key has never been written or is currently deleted,
    /// so "absent then" and "absent now" compare equal.
    fn current_version(&self, key: &Key) -> u64;

    /// Any key under `prefix` whose newest entry (tombstones included) is
    /// newer than `version`.
    fn changed_since(&self, prefix: &Key, version: u64) -> Option<Key>;
}
