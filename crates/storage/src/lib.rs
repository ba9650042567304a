//! Storage layer for Rapport
//!
//! Multi-version in-memory store. Each key holds a chain of versioned
//! entries so transactions can read a stable snapshot while commits land.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;

pub use sharded::{Shard, ShardedStore, VersionChain};
