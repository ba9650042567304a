//! Transaction context
//!
//! A [`TransactionContext`] reads from a fixed snapshot of the store and
//! buffers every write until commit. Nothing it does is visible to other
//! transactions before the engine commits it, and dropping it discards all
//! buffered work.

use rapport_core::{Key, RapportResult, Value};
use rapport_storage::ShardedStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// One unit of work against the store
pub struct TransactionContext {
    /// Transaction identifier (for logs)
    pub txn_id: u64,
    /// Snapshot version all reads are served from
    pub start_version: u64,
    /// Keys read, with the live version observed (0 = absent)
    pub read_set: HashMap<Key, u64>,
    /// Prefixes scanned
    pub scan_set: Vec<Key>,
    /// Buffered puts
    pub write_set: BTreeMap<Key, Value>,
    /// Buffered deletes
    pub delete_set: BTreeSet<Key>,
    store: Arc<ShardedStore>,
}

impl TransactionContext {
    /// Start a transaction reading at `start_version`
    pub fn new(txn_id: u64, store: Arc<ShardedStore>, start_version: u64) -> Self {
        Self {
            txn_id,
            start_version,
            read_set: HashMap::new(),
            scan_set: Vec::new(),
            write_set: BTreeMap::new(),
            delete_set: BTreeSet::new(),
            store,
        }
    }

    /// Read a key
    ///
    /// Buffered writes of this transaction win; otherwise the snapshot is
    /// read and the observed version recorded for validation.
    pub fn get(&mut self, key: &Key) -> RapportResult<Option<Value>> {
        if let Some(value) = self.write_set.get(key) {
            return Ok(Some(value.clone()));
        }
        if self.delete_set.contains(key) {
            return Ok(None);
        }

        let entry = self.store.get_at(key, self.start_version);
        let observed = entry.as_ref().map(|e| e.version).unwrap_or(0);
        self.read_set.entry(key.clone()).or_insert(observed);
        Ok(entry.and_then(|e| e.value))
    }

    /// Check whether a key is live (recorded as a read)
    pub fn exists(&mut self, key: &Key) -> RapportResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Buffer a write
    pub fn put(&mut self, key: Key, value: Value) -> RapportResult<()> {
        self.delete_set.remove(&key);
        self.write_set.insert(key, value);
        Ok(())
    }

    /// Buffer a delete
    pub fn delete(&mut self, key: Key) -> RapportResult<()> {
        self.write_set.remove(&key);
        self.delete_set.insert(key);
        Ok(())
    }

    /// Scan all live keys under `prefix`, sorted by key
    ///
    /// The result reflects this transaction's own buffered writes and
    /// deletes. The prefix is recorded so that a concurrent insert under it
    /// fails validation.
    pub fn scan_prefix(&mut self, prefix: &Key) -> RapportResult<Vec<(Key, Value)>> {
        let mut merged: BTreeMap<Key, Value> = self
            .store
            .scan_prefix_at(prefix, self.start_version)
            .into_iter()
            .filter_map(|(key, entry)| entry.value.map(|v| (key, v)))
            .collect();

        for key in &self.delete_set {
            merged.remove(key);
        }
        for (key, value) in self.write_set.range(prefix.clone()..) {
            if !key.starts_with(prefix) {
                break;
            }
            merged.insert(key.clone(), value.clone());
        }

        if !self.scan_set.contains(prefix) {
            self.scan_set.push(prefix.clone());
        }
        Ok(merged.into_iter().collect())
    }

    /// True if nothing was written or deleted
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty() && self.delete_set.is_empty()
    }

    /// Number of buffered operations
    pub fn pending_operations(&self) -> usize {
        self.write_set.len() + self.delete_set.len()
    }

    /// Consume the transaction, yielding its buffered writes and deletes
    pub fn into_writes(self) -> (Vec<(Key, Value)>, Vec<Key>) {
        (
            self.write_set.into_iter().collect(),
            self.delete_set.into_iter().collect(),
        )
    }
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("txn_id", &self.txn_id)
            .field("start_version", &self.start_version)
            .field("reads", &self.read_set.len())
            .field("scans", &self.scan_set.len())
            .field("writes", &self.write_set.len())
            .field("deletes", &self.delete_set.len())
            .finish()
    }
}
