//! Error types for Rapport
//!
//! [`RapportError`] is the single error type used inside the workspace.
//!
//! ## Error kinds
//!
//! | Kind | Meaning | Transient |
//! |------|---------|-----------|
//! | `SelfReference` | inviting == invited, or source == target | no |
//! | `Duplicate` | an edge already exists for that ordered pair | no |
//! | `NotFound` | invitation, friendship or profile is absent | no |
//! | `Forbidden` | caller is not the party entitled to act | no |
//! | `Conflict` | optimistic validation failed at commit | yes |
//! | `TransactionTimeout` | commit lock not acquired in time | yes |
//!
//! The domain kinds are expected outcomes surfaced to the caller. Transient
//! kinds may be retried by the caller; the core never retries them itself.

use std::fmt;
use thiserror::Error;

use crate::types::{FriendshipId, InvitationId, ProfileId};

/// Reference to the record an error is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// A profile
    Profile(ProfileId),
    /// An invitation by id
    Invitation(InvitationId),
    /// An invitation by ordered pair
    InvitationPair {
        /// Profile that sent the invitation
        inviting: ProfileId,
        /// Profile that received it
        invited: ProfileId,
    },
    /// A friendship edge by id
    Friendship(FriendshipId),
    /// A friendship edge by ordered pair
    FriendshipPair {
        /// Owning side of the edge
        source: ProfileId,
        /// Other side of the edge
        target: ProfileId,
    },
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Profile(id) => write!(f, "profile {}", id),
            EntityRef::Invitation(id) => write!(f, "invitation {}", id),
            EntityRef::InvitationPair { inviting, invited } => {
                write!(f, "invitation {} -> {}", inviting, invited)
            }
            EntityRef::Friendship(id) => write!(f, "friendship {}", id),
            EntityRef::FriendshipPair { source, target } => {
                write!(f, "friendship {} -> {}", source, target)
            }
        }
    }
}

/// Errors produced by any Rapport layer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RapportError {
    /// An edge would connect a profile to itself
    #[error("self reference: {entity}")]
    SelfReference {
        /// The rejected edge
        entity: EntityRef,
    },

    /// The ordered pair already has an edge
    #[error("already exists: {entity}")]
    Duplicate {
        /// The existing edge
        entity: EntityRef,
    },

    /// Referenced record does not exist (or was consumed concurrently)
    #[error("not found: {entity}")]
    NotFound {
        /// The missing record
        entity: EntityRef,
    },

    /// Caller may not act on this record
    #[error("forbidden: profile {caller} may not act on {entity}")]
    Forbidden {
        /// The protected record
        entity: EntityRef,
        /// The profile that attempted the action
        caller: ProfileId,
    },

    /// Commit-time validation found a concurrent write
    #[error("transaction conflict: {reason}")]
    Conflict {
        /// Which key conflicted and how
        reason: String,
    },

    /// Commit lock could not be acquired in time
    #[error("transaction timed out after {duration_ms}ms")]
    TransactionTimeout {
        /// Configured wait
        duration_ms: u64,
    },

    /// Caller supplied malformed input
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong
        message: String,
    },

    /// A stored record could not be encoded or decoded
    #[error("serialization error: {message}")]
    Serialization {
        /// Decoder message
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Internal invariant broken
    #[error("internal error: {message}")]
    Internal {
        /// Description
        message: String,
    },
}

impl RapportError {
    /// Self-reference on the given edge
    pub fn self_reference(entity: EntityRef) -> Self {
        RapportError::SelfReference { entity }
    }

    /// Duplicate of the given edge
    pub fn duplicate(entity: EntityRef) -> Self {
        RapportError::Duplicate { entity }
    }

    /// Missing record
    pub fn not_found(entity: EntityRef) -> Self {
        RapportError::NotFound { entity }
    }

    /// Caller not entitled to act on `entity`
    pub fn forbidden(entity: EntityRef, caller: ProfileId) -> Self {
        RapportError::Forbidden { entity, caller }
    }

    /// Optimistic validation failure
    pub fn conflict(reason: impl Into<String>) -> Self {
        RapportError::Conflict {
            reason: reason.into(),
        }
    }

    /// Malformed input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RapportError::InvalidInput {
            message: message.into(),
        }
    }

    /// Encoding/decoding failure
    pub fn serialization(message: impl Into<String>) -> Self {
        RapportError::Serialization {
            message: message.into(),
        }
    }

    /// Configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        RapportError::Config {
            message: message.into(),
        }
    }

    /// Internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        RapportError::Internal {
            message: message.into(),
        }
    }

    /// True for storage-layer failures the caller may retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RapportError::Conflict { .. } | RapportError::TransactionTimeout { .. }
        )
    }

    /// True for the four domain outcomes (SelfReference, Duplicate, NotFound, Forbidden)
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            RapportError::SelfReference { .. }
                | RapportError::Duplicate { .. }
                | RapportError::NotFound { .. }
                | RapportError::Forbidden { .. }
        )
    }
}

impl From<serde_json::Error> for RapportError {
    fn from(e: serde_json::Error) -> Self {
        RapportError::serialization(e.to_string())
    }
}

/// Result alias used across the workspace
pub type RapportResult<T> = Result<T, RapportError>;
