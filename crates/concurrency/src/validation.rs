//! Transaction validation for OCC
//!
//! Conflict detection run by the engine under the commit lock:
//! - First-committer-wins based on the READ-SET and SCAN-SET, not the write-set
//! - Blind writes (write without read) do NOT conflict
//! - Read-only transactions are never validated
//!
//! A key that was absent when read and is absent now (never written, or
//! deleted) is not a conflict: both sides are version 0.

use crate::transaction::TransactionContext;
use rapport_core::{Key, Storage};
use std::collections::HashMap;
use std::fmt;

/// Types of conflicts that can occur during transaction validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// A key was read at one version but the current version differs
    ReadWriteConflict {
        /// The key that has a conflict
        key: Key,
        /// Version recorded in read_set when read
        read_version: u64,
        /// Current version in storage at validation time
        current_version: u64,
    },

    /// A key under a scanned prefix was inserted, changed or deleted after
    /// the transaction's snapshot
    PhantomConflict {
        /// The scanned prefix
        prefix: Key,
        /// The key that changed under it
        key: Key,
    },
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::ReadWriteConflict {
                key,
                read_version,
                current_version,
            } => write!(
                f,
                "{} read at version {} is now at version {}",
                key, read_version, current_version
            ),
            ConflictType::PhantomConflict { prefix, key } => {
                write!(f, "{} changed under scanned prefix {}", key, prefix)
            }
        }
    }
}

/// Result of transaction validation
///
/// Accumulates all conflicts found during validation.
/// A transaction commits only if is_valid() returns true.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Create a validation result with a single conflict
    pub fn conflict(conflict: ConflictType) -> Self {
        ValidationResult {
            conflicts: vec![conflict],
        }
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.conflicts.extend(other.conflicts);
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// Human-readable summary of the first conflict, for error messages
    pub fn summary(&self) -> String {
        match self.conflicts.first() {
            Some(first) if self.conflicts.len() > 1 => {
                format!("{} (+{} more)", first, self.conflicts.len() - 1)
            }
            Some(first) => first.to_string(),
            None => String::from("no conflict"),
        }
    }
}

/// Validate the read-set against current storage state
///
/// For each key in `read_set`, the current live version must equal the
/// version recorded when the key was read.
pub fn validate_read_set<S: Storage>(read_set: &HashMap<Key, u64>, store: &S) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for (key, read_version) in read_set {
        let current_version = store.current_version(key);
        if current_version != *read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: key.clone(),
                read_version: *read_version,
                current_version,
            });
        }
    }

    result
}

/// Validate scanned prefixes against current storage state
///
/// Any key under a scanned prefix whose newest entry is later than
/// `start_version` is a phantom.
pub fn validate_scan_set<S: Storage>(
    scan_set: &[Key],
    start_version: u64,
    store: &S,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for prefix in scan_set {
        if let Some(key) = store.changed_since(prefix, start_version) {
            result.conflicts.push(ConflictType::PhantomConflict {
                prefix: prefix.clone(),
                key,
            });
        }
    }

    result
}

/// Validate a whole transaction
///
/// Read-only transactions always pass.
pub fn validate_transaction<S: Storage>(txn: &TransactionContext, store: &S) -> ValidationResult {
    if txn.is_read_only() {
        return ValidationResult::ok();
    }

    let mut result = validate_read_set(&txn.read_set, store);
    result.merge(validate_scan_set(&txn.scan_set, txn.start_version, store));
    result
}
