//! Public error type.
//!
//! Internal [`RapportError`]s are converted at the API boundary. Domain
//! outcomes keep their kind; storage-level conflicts and timeouts all become
//! [`Error::Transient`] and are never reported as a domain kind.

use rapport_core::{ProfileId, RapportError};

/// Errors returned by [`Rapport`](crate::Rapport) operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An invitation or friendship would connect a profile to itself
    #[error("self reference: {entity}")]
    SelfReference {
        /// The rejected edge
        entity: String,
    },

    /// An invitation or friendship already exists for this ordered pair
    #[error("already exists: {entity}")]
    Duplicate {
        /// The existing edge
        entity: String,
    },

    /// The invitation, friendship or profile does not exist
    #[error("not found: {entity}")]
    NotFound {
        /// The missing record
        entity: String,
    },

    /// The caller is not the party entitled to this action
    #[error("forbidden: profile {caller} may not act on {entity}")]
    Forbidden {
        /// The protected record
        entity: String,
        /// The profile that attempted the action
        caller: ProfileId,
    },

    /// A concurrent operation interfered; the request may be retried
    #[error("transient failure, retry: {reason}")]
    Transient {
        /// What interfered
        reason: String,
    },

    /// The request was malformed
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// Something that should not happen did
    #[error("internal error: {reason}")]
    Internal {
        /// Description
        reason: String,
    },
}

impl Error {
    /// True if the same request may succeed when retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transient { .. })
    }
}

/// Result alias for the public API
pub type Result<T> = std::result::Result<T, Error>;

impl From<RapportError> for Error {
    fn from(err: RapportError) -> Self {
        match err {
            // Domain outcomes
            RapportError::SelfReference { entity } => Error::SelfReference {
                entity: entity.to_string(),
            },
            RapportError::Duplicate { entity } => Error::Duplicate {
                entity: entity.to_string(),
            },
            RapportError::NotFound { entity } => Error::NotFound {
                entity: entity.to_string(),
            },
            RapportError::Forbidden { entity, caller } => Error::Forbidden {
                entity: entity.to_string(),
                caller,
            },

            // Temporal failures
            RapportError::Conflict { reason } => Error::Transient { reason },
            RapportError::TransactionTimeout { duration_ms } => Error::Transient {
                reason: format!("commit timed out after {}ms", duration_ms),
            },

            // Validation errors
            RapportError::InvalidInput { message } => Error::InvalidInput { reason: message },
            RapportError::Config { message } => Error::InvalidInput {
                reason: format!("configuration: {}", message),
            },

            // System errors
            RapportError::Serialization { message } => Error::Internal {
                reason: format!("corrupt record: {}", message),
            },
            RapportError::Internal { message } => Error::Internal { reason: message },
        }
    }
}
