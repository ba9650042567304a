//! Identifier and key types
//!
//! Every record in the store is addressed by a [`Key`]: a [`Space`] plus a
//! `/`-separated user key. Identifiers are UUID newtypes rendered in the
//! 32-character "simple" hex form, which never contains the separator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::RapportError;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier (UUID v4)
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Build from raw bytes
            pub fn from_bytes(bytes: [u8; 16]) -> Self {
                Self(Uuid::from_bytes(bytes))
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.simple())
            }
        }

        impl FromStr for $name {
            type Err = RapportError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|e| {
                    RapportError::invalid_input(format!("invalid {} '{}': {}", $label, s, e))
                })
            }
        }
    };
}

uuid_id!(
    /// Stable identifier of a profile (the external principal uuid).
    ProfileId,
    "profile id"
);
uuid_id!(
    /// Identifier of a friendship invitation.
    InvitationId,
    "invitation id"
);
uuid_id!(
    /// Identifier of one directed friendship edge.
    FriendshipId,
    "friendship id"
);

/// Microseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_micros())
    }

    /// Build from a raw microsecond count
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Raw microsecond count
    pub fn as_micros(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match chrono::DateTime::from_timestamp_micros(self.0) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}us", self.0),
        }
    }
}

/// Key space a record lives in.
///
/// The store keeps one shard per space, so scans never cross spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Space {
    /// `{profile}` -> profile record
    Profile,
    /// `{inviting}/{invited}` -> invitation record
    Invitation,
    /// `{invitation_id}` -> `{inviting}/{invited}`
    InvitationById,
    /// `{invited}/{inviting}` -> invitation id
    InvitationReceived,
    /// `{source}/{target}` -> friendship record
    Friendship,
    /// `{friendship_id}` -> `{source}/{target}`
    FriendshipById,
}

impl Space {
    /// All spaces, in key order
    pub const ALL: [Space; 6] = [
        Space::Profile,
        Space::Invitation,
        Space::InvitationById,
        Space::InvitationReceived,
        Space::Friendship,
        Space::FriendshipById,
    ];

    /// Short stable name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Space::Profile => "profile",
            Space::Invitation => "invitation",
            Space::InvitationById => "invitation_id",
            Space::InvitationReceived => "invitation_received",
            Space::Friendship => "friendship",
            Space::FriendshipById => "friendship_id",
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage key: a space plus a user key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Space (shard) this key belongs to
    pub space: Space,
    /// Path within the space, `/`-separated
    pub user_key: String,
}

impl Key {
    /// Create a key
    pub fn new(space: Space, user_key: impl Into<String>) -> Self {
        Self {
            space,
            user_key: user_key.into(),
        }
    }

    /// Create a prefix key for scans
    ///
    /// A prefix is an ordinary key; it matches every key in the same space
    /// whose user key starts with it.
    pub fn prefix(space: Space, prefix: impl Into<String>) -> Self {
        Self::new(space, prefix)
    }

    /// Check whether this key falls under `prefix`
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.space == prefix.space && self.user_key.starts_with(&prefix.user_key)
    }

    /// The user key as a string slice
    pub fn user_key(&self) -> &str {
        &self.user_key
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.space, self.user_key)
    }
}
