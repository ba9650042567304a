//! Record types for the relationship primitives.

use rapport_core::{FriendshipId, InvitationId, ProfileId, Timestamp};
use serde::{Deserialize, Serialize};

/// Maximum display name length, in characters.
pub const MAX_NAME_LEN: usize = 128;

/// A principal that sends and receives invitations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    /// Stable external identifier.
    pub id: ProfileId,
    /// Display name.
    pub name: String,
    /// When the profile was created.
    pub created_at: Timestamp,
    /// When the profile was last modified.
    pub updated_at: Timestamp,
}

impl Profile {
    /// A new profile stamped with the current time.
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A profile as seen by another profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FriendProfile {
    /// The listed profile.
    pub profile: Profile,
    /// Whether the viewer holds a friendship edge to it.
    pub is_friend: bool,
}

/// A pending friendship request from `inviting` to `invited`.
///
/// The ordered pair is the record's primary key; `id` is a handle for
/// callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FriendshipInvitation {
    /// Invitation handle.
    pub id: InvitationId,
    /// Profile that sent the invitation.
    pub inviting: ProfileId,
    /// Profile that may accept or reject it.
    pub invited: ProfileId,
    /// When the invitation was created.
    pub created_at: Timestamp,
    /// When the invitation was last modified.
    pub updated_at: Timestamp,
}

impl FriendshipInvitation {
    /// A new invitation stamped with the current time.
    pub fn new(inviting: ProfileId, invited: ProfileId) -> Self {
        let now = Timestamp::now();
        Self {
            id: InvitationId::new(),
            inviting,
            invited,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One directed friendship edge. Edges always exist in symmetric pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Friendship {
    /// Edge handle.
    pub id: FriendshipId,
    /// Owning side.
    pub source: ProfileId,
    /// Other side.
    pub target: ProfileId,
    /// When the edge was created.
    pub created_at: Timestamp,
    /// When the edge was last modified.
    pub updated_at: Timestamp,
}

impl Friendship {
    /// A new edge stamped with the current time.
    pub fn new(source: ProfileId, target: ProfileId) -> Self {
        let now = Timestamp::now();
        Self {
            id: FriendshipId::new(),
            source,
            target,
            created_at: now,
            updated_at: now,
        }
    }

    /// True if `other` is the reverse edge of `self`.
    pub fn is_reverse_of(&self, other: &Friendship) -> bool {
        self.source == other.target && self.target == other.source
    }
}

/// Sort newest `updated_at` first; ties broken by id for a stable order.
pub(crate) fn newest_updated_first<T, K: Ord>(
    items: &mut [T],
    updated_at: impl Fn(&T) -> Timestamp,
    tie: impl Fn(&T) -> K,
) {
    items.sort_by(|a, b| {
        updated_at(b)
            .cmp(&updated_at(a))
            .then_with(|| tie(a).cmp(&tie(b)))
    });
}
