//! Database configuration
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```toml
//! commit_timeout_ms = 5000
//! gc_interval = 256
//! shard_capacity = 1024
//! ```

use rapport_core::{RapportError, RapportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default wait for the commit lock
pub const DEFAULT_COMMIT_TIMEOUT_MS: u64 = 5_000;
/// Default number of commits between GC passes
pub const DEFAULT_GC_INTERVAL: u64 = 256;
/// Default initial capacity of each shard
pub const DEFAULT_SHARD_CAPACITY: usize = 1_024;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Maximum time a commit waits for the commit lock, in milliseconds
    pub commit_timeout_ms: u64,
    /// Run version GC every this many commits (0 disables automatic GC)
    pub gc_interval: u64,
    /// Initial capacity of each key-space shard
    pub shard_capacity: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            commit_timeout_ms: DEFAULT_COMMIT_TIMEOUT_MS,
            gc_interval: DEFAULT_GC_INTERVAL,
            shard_capacity: DEFAULT_SHARD_CAPACITY,
        }
    }
}

impl DatabaseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(s: &str) -> RapportResult<Self> {
        let config: DatabaseConfig =
            toml::from_str(s).map_err(|e| RapportError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> RapportResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RapportError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> RapportResult<String> {
        toml::to_string(self).map_err(|e| RapportError::config(e.to_string()))
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> RapportResult<()> {
        if self.commit_timeout_ms == 0 {
            return Err(RapportError::config("commit_timeout_ms must be greater than 0"));
        }
        if self.shard_capacity == 0 {
            return Err(RapportError::config("shard_capacity must be greater than 0"));
        }
        Ok(())
    }

    /// Commit lock wait as a `Duration`
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_timeout_ms)
    }
}

/// Bounded retry on transient failures
///
/// Used with [`Database::transaction_with_retry`](crate::Database::transaction_with_retry).
/// Domain errors are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Sleep between attempts, in milliseconds
    pub backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 16,
            backoff_ms: 0,
        }
    }
}

impl RetryPolicy {
    /// Policy allowing `retries` retries after the first attempt
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Self::default()
        }
    }

    /// Set the backoff between attempts
    pub fn backoff_ms(mut self, backoff_ms: u64) -> Self {
        self.backoff_ms = backoff_ms;
        self
    }

    /// A single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff_ms: 0,
        }
    }
}
