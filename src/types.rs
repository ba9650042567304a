//! Public types for the Rapport API.
//!
//! This module re-exports types from internal crates with a clean public interface.

// ============================================================================
// Identifiers and time
// ============================================================================

pub use rapport_core::{FriendshipId, InvitationId, ProfileId, Timestamp};

// ============================================================================
// Records
// ============================================================================

pub use rapport_primitives::{
    CascadeSummary, FriendProfile, Friendship, FriendshipInvitation, GraphAudit, Invitation,
    InvitationKind, Profile,
};

// ============================================================================
// Engine configuration
// ============================================================================

pub use rapport_engine::{DatabaseConfig, DatabaseStats, RetryPolicy};
