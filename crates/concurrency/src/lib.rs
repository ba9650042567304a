//! Concurrency layer for Rapport
//!
//! Optimistic concurrency control over the multi-version store:
//! - TransactionContext: buffered writes, read-set and scan-set tracking
//! - Validation: first-committer-wins conflict detection at commit

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod transaction;
pub mod validation;

pub use transaction::TransactionContext;
pub use validation::{
    validate_read_set, validate_scan_set, validate_transaction, ConflictType, ValidationResult,
};
