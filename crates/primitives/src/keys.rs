//! Key construction and parsing for relationship storage.
//!
//! Key format uses `/` as a separator between the two profile ids of an
//! ordered pair. Ids render as simple hex and never contain the separator,
//! so `{a}/` is an exact prefix for "everything whose first party is `a`".
//!
//! | Space | User key | Value |
//! |-------|----------|-------|
//! | `Profile` | `{profile}` | profile record |
//! | `Invitation` | `{inviting}/{invited}` | invitation record |
//! | `InvitationById` | `{invitation_id}` | `{inviting}/{invited}` |
//! | `InvitationReceived` | `{invited}/{inviting}` | invitation id |
//! | `Friendship` | `{source}/{target}` | friendship record |
//! | `FriendshipById` | `{friendship_id}` | `{source}/{target}` |

use rapport_core::{
    FriendshipId, InvitationId, Key, ProfileId, RapportError, RapportResult, Space,
};

/// Separator used between the two ids of a pair.
const SEP: char = '/';

// =============================================================================
// Pairs
// =============================================================================

/// Render an ordered pair: `{a}/{b}`
pub fn pair(a: ProfileId, b: ProfileId) -> String {
    format!("{}{SEP}{}", a, b)
}

/// Parse an ordered pair back into its two ids.
pub fn parse_pair(s: &str) -> RapportResult<(ProfileId, ProfileId)> {
    let (a, b) = s
        .split_once(SEP)
        .ok_or_else(|| RapportError::invalid_input(format!("malformed pair '{}'", s)))?;
    Ok((a.parse()?, b.parse()?))
}

fn first_party_prefix(space: Space, a: ProfileId) -> Key {
    Key::prefix(space, format!("{}{SEP}", a))
}

/// Prefix matching every key in `space`.
pub fn space_prefix(space: Space) -> Key {
    Key::prefix(space, "")
}

// =============================================================================
// Key Construction
// =============================================================================

// --- Profiles ---

/// Key for a profile: `{profile}`
pub fn profile_key(id: ProfileId) -> Key {
    Key::new(Space::Profile, id.to_string())
}

/// Parse a profile key back into its id.
pub fn parse_profile_key(key: &Key) -> Option<ProfileId> {
    if key.space != Space::Profile {
        return None;
    }
    key.user_key().parse().ok()
}

// --- Invitations ---

/// Key for an invitation record: `{inviting}/{invited}`
pub fn invitation_key(inviting: ProfileId, invited: ProfileId) -> Key {
    Key::new(Space::Invitation, pair(inviting, invited))
}

/// Prefix for every invitation sent by a profile: `{inviting}/`
pub fn invitations_sent_prefix(inviting: ProfileId) -> Key {
    first_party_prefix(Space::Invitation, inviting)
}

/// Key for the id index: `{invitation_id}` -> `{inviting}/{invited}`
pub fn invitation_id_key(id: InvitationId) -> Key {
    Key::new(Space::InvitationById, id.to_string())
}

/// Key for the received index: `{invited}/{inviting}` -> invitation id
pub fn invitation_received_key(invited: ProfileId, inviting: ProfileId) -> Key {
    Key::new(Space::InvitationReceived, pair(invited, inviting))
}

/// Prefix for every invitation received by a profile: `{invited}/`
pub fn invitations_received_prefix(invited: ProfileId) -> Key {
    first_party_prefix(Space::InvitationReceived, invited)
}

// --- Friendships ---

/// Key for a friendship edge: `{source}/{target}`
pub fn friendship_key(source: ProfileId, target: ProfileId) -> Key {
    Key::new(Space::Friendship, pair(source, target))
}

/// Prefix for every edge owned by a profile: `{source}/`
pub fn friendships_from_prefix(source: ProfileId) -> Key {
    first_party_prefix(Space::Friendship, source)
}

/// Key for the id index: `{friendship_id}` -> `{source}/{target}`
pub fn friendship_id_key(id: FriendshipId) -> Key {
    Key::new(Space::FriendshipById, id.to_string())
}

/// Parse a pair-keyed storage key (`Invitation`, `InvitationReceived`,
/// `Friendship`) into its two ids, in key order.
pub fn parse_pair_key(key: &Key) -> Option<(ProfileId, ProfileId)> {
    match key.space {
        Space::Invitation | Space::InvitationReceived | Space::Friendship => {
            parse_pair(key.user_key()).ok()
        }
        _ => None,
    }
}
