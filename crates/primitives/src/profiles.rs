//! Profile store primitive
//!
//! Profiles are the principals invitations and friendships refer to.
//! Deleting a profile cascades, in the same transaction, to every
//! invitation it sent or received and every friendship pair it is part of,
//! so no edge ever outlives one of its profiles.

use std::collections::HashSet;
use std::sync::Arc;

use rapport_concurrency::TransactionContext;
use rapport_core::{EntityRef, ProfileId, RapportError, RapportResult, Timestamp};
use rapport_engine::Database;

use crate::codec::{decode, decode_opt, encode};
use crate::friendships;
use crate::invitations;
use crate::keys;
use crate::types::{FriendProfile, Profile, MAX_NAME_LEN};

// =============================================================================
// Validation
// =============================================================================

/// Validate a display name.
pub fn validate_name(name: &str) -> RapportResult<()> {
    if name.trim().is_empty() {
        return Err(RapportError::invalid_input("Profile name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RapportError::invalid_input(format!(
            "Profile name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

fn get_in(txn: &mut TransactionContext, id: ProfileId) -> RapportResult<Option<Profile>> {
    decode_opt(txn.get(&keys::profile_key(id))?)
}

/// Fail with `NotFound` unless the profile exists.
///
/// The read is recorded, so a concurrent delete of the profile makes the
/// surrounding transaction fail validation.
pub fn require_live(txn: &mut TransactionContext, id: ProfileId) -> RapportResult<Profile> {
    get_in(txn, id)?.ok_or_else(|| RapportError::not_found(EntityRef::Profile(id)))
}

fn list_in(txn: &mut TransactionContext) -> RapportResult<Vec<Profile>> {
    let mut profiles: Vec<Profile> = txn
        .scan_prefix(&keys::space_prefix(rapport_core::Space::Profile))?
        .into_iter()
        .map(|(_, value)| decode(&value))
        .collect::<RapportResult<_>>()?;
    profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(profiles)
}

/// Counts of what a profile delete removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    /// Invitations the profile had sent
    pub invitations_sent: usize,
    /// Invitations the profile had received
    pub invitations_received: usize,
    /// Friendship pairs (each counted once)
    pub friendships: usize,
}

// =============================================================================
// Facade
// =============================================================================

/// Profile store primitive
///
/// Holds only an `Arc<Database>`; clone is cheap.
#[derive(Clone)]
pub struct ProfileStore {
    db: Arc<Database>,
}

impl ProfileStore {
    /// Create a new ProfileStore backed by the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a profile under an external id.
    ///
    /// `Duplicate` if the id is taken, `InvalidInput` for a bad name.
    pub fn create(&self, id: ProfileId, name: &str) -> RapportResult<Profile> {
        validate_name(name)?;
        self.db.transaction(|txn| {
            let key = keys::profile_key(id);
            if txn.exists(&key)? {
                return Err(RapportError::duplicate(EntityRef::Profile(id)));
            }
            let profile = Profile::new(id, name);
            txn.put(key, encode(&profile)?)?;
            Ok(profile)
        })
    }

    /// Look up a profile.
    pub fn get(&self, id: ProfileId) -> RapportResult<Option<Profile>> {
        self.db.transaction(|txn| get_in(txn, id))
    }

    /// Check whether a profile exists.
    pub fn exists(&self, id: ProfileId) -> RapportResult<bool> {
        self.db.transaction(|txn| txn.exists(&keys::profile_key(id)))
    }

    /// All profiles, newest `created_at` first.
    pub fn list(&self) -> RapportResult<Vec<Profile>> {
        self.db.transaction(list_in)
    }

    /// Every profile except `viewer`, each flagged with whether `viewer`
    /// is friends with it. Newest `created_at` first.
    pub fn list_with_friend_flag(&self, viewer: ProfileId) -> RapportResult<Vec<FriendProfile>> {
        self.db.transaction(|txn| {
            let friends: HashSet<ProfileId> = friendships::friends_of_in(txn, viewer)?
                .into_iter()
                .map(|edge| edge.target)
                .collect();
            Ok(list_in(txn)?
                .into_iter()
                .filter(|profile| profile.id != viewer)
                .map(|profile| FriendProfile {
                    is_friend: friends.contains(&profile.id),
                    profile,
                })
                .collect())
        })
    }

    /// Change a profile's display name.
    pub fn rename(&self, id: ProfileId, name: &str) -> RapportResult<Profile> {
        validate_name(name)?;
        self.db.transaction(|txn| {
            let mut profile = require_live(txn, id)?;
            profile.name = name.to_string();
            profile.updated_at = Timestamp::now();
            txn.put(keys::profile_key(id), encode(&profile)?)?;
            Ok(profile)
        })
    }

    /// Delete a profile and everything that refers to it.
    ///
    /// One transaction removes the profile, every invitation it sent or
    /// received, and both directions of each of its friendships. The
    /// scans are validated at commit, so an invitation or friendship
    /// created concurrently makes this fail with `Conflict` instead of
    /// being left dangling.
    pub fn delete(&self, id: ProfileId) -> RapportResult<CascadeSummary> {
        let summary = self.db.transaction(|txn| {
            require_live(txn, id)?;
            let mut summary = CascadeSummary::default();

            for invitation in invitations::sent_by_in(txn, id)? {
                invitations::retire_in(txn, &invitation)?;
                summary.invitations_sent += 1;
            }
            for invitation in invitations::received_by_in(txn, id)? {
                invitations::retire_in(txn, &invitation)?;
                summary.invitations_received += 1;
            }
            for edge in friendships::friends_of_in(txn, id)? {
                if friendships::unlink_pair(txn, edge.source, edge.target)? {
                    summary.friendships += 1;
                }
            }
            txn.delete(keys::profile_key(id))?;
            Ok(summary)
        })?;

        tracing::info!(
            profile = %id,
            invitations_sent = summary.invitations_sent,
            invitations_received = summary.invitations_received,
            friendships = summary.friendships,
            "profile deleted with cascade"
        );
        Ok(summary)
    }
}
