//! Database engine for Rapport
//!
//! Ties the store and the OCC layer together:
//! - [`Database`]: closure transactions with snapshot isolation
//! - [`DatabaseConfig`]: commit timeout, GC cadence, shard sizing (TOML)
//! - [`RetryPolicy`]: bounded retry for callers that opt into it

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod database;
pub mod snapshot;

pub use config::{DatabaseConfig, RetryPolicy};
pub use database::{Database, DatabaseStats};
pub use snapshot::{SnapshotGuard, SnapshotRegistry};

pub use rapport_concurrency::TransactionContext;
