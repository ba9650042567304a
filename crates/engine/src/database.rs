//! Database: transactions over the sharded store
//!
//! ## Commit protocol
//!
//! 1. Pin a snapshot at the published version
//! 2. Run the closure against a fresh [`TransactionContext`]
//! 3. On closure error, drop the context (nothing is applied)
//! 4. Acquire the commit lock, waiting at most `commit_timeout_ms`
//! 5. Validate the read set and scan set against the latest state
//! 6. Assign one version, apply the batch, publish it
//!
//! Readers only see published versions, so a commit becomes visible all at
//! once. Nothing here retries; see [`Database::transaction_with_retry`].

use crate::config::{DatabaseConfig, RetryPolicy};
use crate::snapshot::SnapshotRegistry;
use parking_lot::{Mutex, RwLock};
use rapport_concurrency::{validate_transaction, TransactionContext};
use rapport_core::{RapportError, RapportResult};
use rapport_storage::ShardedStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counters since the database was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Write transactions committed
    pub commits: u64,
    /// Commits rejected by validation
    pub conflicts: u64,
    /// Transactions whose closure returned an error
    pub aborts: u64,
    /// Commits that could not take the commit lock in time
    pub timeouts: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    commits: AtomicU64,
    conflicts: AtomicU64,
    aborts: AtomicU64,
    timeouts: AtomicU64,
}

/// In-process transactional database
///
/// Shared between threads as `Arc<Database>`. All cross-record invariants
/// above this layer rely on its snapshot isolation and first-committer-wins
/// validation.
pub struct Database {
    storage: Arc<ShardedStore>,
    config: RwLock<DatabaseConfig>,
    commit_lock: Mutex<()>,
    snapshots: SnapshotRegistry,
    next_txn_id: AtomicU64,
    stats: StatsCounters,
}

impl Database {
    /// In-memory database with the default configuration
    pub fn cache() -> Arc<Self> {
        Arc::new(Self::build(DatabaseConfig::default()))
    }

    /// In-memory database with an explicit configuration
    pub fn with_config(config: DatabaseConfig) -> RapportResult<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self::build(config)))
    }

    fn build(config: DatabaseConfig) -> Self {
        tracing::info!(
            commit_timeout_ms = config.commit_timeout_ms,
            gc_interval = config.gc_interval,
            "opening database"
        );
        Self {
            storage: Arc::new(ShardedStore::with_capacity(config.shard_capacity)),
            config: RwLock::new(config),
            commit_lock: Mutex::new(()),
            snapshots: SnapshotRegistry::new(),
            next_txn_id: AtomicU64::new(1),
            stats: StatsCounters::default(),
        }
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Run `f` in one transaction and commit it
    ///
    /// If `f` returns an error every buffered write is discarded and the
    /// error is returned unchanged. A commit that fails validation returns
    /// [`RapportError::Conflict`]; one that cannot take the commit lock in
    /// time returns [`RapportError::TransactionTimeout`].
    pub fn transaction<F, T>(&self, f: F) -> RapportResult<T>
    where
        F: FnOnce(&mut TransactionContext) -> RapportResult<T>,
    {
        let snapshot = self.snapshots.register(&self.storage);
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
        let mut txn = TransactionContext::new(txn_id, Arc::clone(&self.storage), snapshot.version());

        let output = match f(&mut txn) {
            Ok(output) => output,
            Err(e) => {
                self.stats.aborts.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(txn_id, error = %e, "transaction aborted");
                return Err(e);
            }
        };

        self.commit(txn)?;
        drop(snapshot);
        Ok(output)
    }

    /// Run `f` with bounded retry on transient failures
    ///
    /// `f` is re-run from a fresh snapshot after each `Conflict` or
    /// `TransactionTimeout`, up to `policy.max_attempts` attempts in total.
    /// Any other error is returned at once.
    pub fn transaction_with_retry<F, T>(&self, policy: RetryPolicy, mut f: F) -> RapportResult<T>
    where
        F: FnMut(&mut TransactionContext) -> RapportResult<T>,
    {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.transaction(|txn| f(txn)) {
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    tracing::debug!(attempt, max_attempts, error = %e, "retrying transaction");
                    if policy.backoff_ms > 0 {
                        std::thread::sleep(Duration::from_millis(policy.backoff_ms));
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn commit(&self, txn: TransactionContext) -> RapportResult<()> {
        // Read-only transactions saw one published snapshot; nothing to validate
        if txn.is_read_only() {
            return Ok(());
        }

        let (timeout, gc_interval) = {
            let config = self.config.read();
            (config.commit_timeout(), config.gc_interval)
        };

        let _guard = match self.commit_lock.try_lock_for(timeout) {
            Some(guard) => guard,
            None => {
                self.stats.timeouts.fetch_add(1, Ordering::Relaxed);
                let duration_ms = timeout.as_millis() as u64;
                tracing::warn!(txn_id = txn.txn_id, duration_ms, "commit lock timeout");
                return Err(RapportError::TransactionTimeout { duration_ms });
            }
        };

        let result = validate_transaction(&txn, self.storage.as_ref());
        if !result.is_valid() {
            self.stats.conflicts.fetch_add(1, Ordering::Relaxed);
            let reason = result.summary();
            tracing::warn!(
                txn_id = txn.txn_id,
                conflicts = result.conflict_count(),
                reason = %reason,
                "commit rejected"
            );
            return Err(RapportError::conflict(reason));
        }

        let txn_id = txn.txn_id;
        let (writes, deletes) = txn.into_writes();
        let version = self.storage.next_version();
        self.storage.apply_batch(&writes, &deletes, version);
        self.storage.publish(version);

        let commits = self.stats.commits.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(
            txn_id,
            version,
            writes = writes.len(),
            deletes = deletes.len(),
            "committed"
        );

        if gc_interval > 0 && commits % gc_interval == 0 {
            self.run_gc();
        }
        Ok(())
    }

    // ========================================================================
    // Maintenance and introspection
    // ========================================================================

    /// Prune versions no active snapshot can see
    ///
    /// Returns the number of entries removed. Runs automatically every
    /// `gc_interval` commits.
    pub fn gc(&self) -> usize {
        let _guard = self.commit_lock.lock();
        self.run_gc()
    }

    // Caller holds the commit lock
    fn run_gc(&self) -> usize {
        let horizon = self.snapshots.horizon(self.storage.version());
        self.storage.gc(horizon)
    }

    /// Last published commit version
    pub fn version(&self) -> u64 {
        self.storage.version()
    }

    /// Number of transactions currently holding a snapshot
    pub fn active_snapshots(&self) -> usize {
        self.snapshots.active_count()
    }

    /// Direct access to the underlying store
    pub fn storage(&self) -> &Arc<ShardedStore> {
        &self.storage
    }

    /// Copy of the current configuration
    pub fn config(&self) -> DatabaseConfig {
        self.config.read().clone()
    }

    /// Modify the configuration in place
    ///
    /// The change is validated first; an invalid result leaves the current
    /// configuration untouched. Takes effect for the next commit.
    pub fn update_config<F>(&self, f: F) -> RapportResult<()>
    where
        F: FnOnce(&mut DatabaseConfig),
    {
        let mut config = self.config.write();
        let mut next = config.clone();
        f(&mut next);
        next.validate()?;
        tracing::info!(
            commit_timeout_ms = next.commit_timeout_ms,
            gc_interval = next.gc_interval,
            "configuration updated"
        );
        *config = next;
        Ok(())
    }

    /// Snapshot of the counters
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            commits: self.stats.commits.load(Ordering::Relaxed),
            conflicts: self.stats.conflicts.load(Ordering::Relaxed),
            aborts: self.stats.aborts.load(Ordering::Relaxed),
            timeouts: self.stats.timeouts.load(Ordering::Relaxed),
        }
    }

    #[cfg(test)]
    fn hold_commit_lock(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.commit_lock.lock()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("version", &self.version())
            .field("active_snapshots", &self.active_snapshots())
            .field("stats", &self.stats())
            .finish()
    }
}
