//! The Rapport API surface.
//!
//! [`Rapport`] exposes exactly the external operations. Each call runs in
//! one transaction and converts internal errors at the boundary. Nothing
//! here retries: a [`Error::Transient`] goes back to the caller.

use std::sync::Arc;

use rapport_core::RapportResult;
use rapport_engine::{Database, DatabaseConfig};
use rapport_primitives::{FriendshipGraph, InvitationLedger, ProfileStore};

use crate::types::*;
use crate::{Error, Result};

/// Handle to a friendship graph
///
/// Clone is cheap; clones share the same database. Safe to call from many
/// threads at once.
#[derive(Clone)]
pub struct Rapport {
    db: Arc<Database>,
    profiles: ProfileStore,
    invitations: InvitationLedger,
    friendships: FriendshipGraph,
}

impl Rapport {
    fn new(db: Arc<Database>) -> Self {
        Self {
            profiles: ProfileStore::new(db.clone()),
            invitations: InvitationLedger::new(db.clone()),
            friendships: FriendshipGraph::new(db.clone()),
            db,
        }
    }

    /// In-memory graph with the default engine configuration.
    pub fn cache() -> Self {
        Self::new(Database::cache())
    }

    /// In-memory graph with an explicit engine configuration.
    pub fn with_config(config: DatabaseConfig) -> Result<Self> {
        Ok(Self::new(surface("with_config", Database::with_config(config))?))
    }

    // =========================================================================
    // Invitations (6)
    // =========================================================================

    /// Invite `invited` to become friends with `inviting`.
    ///
    /// Fails with `SelfReference`, `NotFound` (either profile) or `Duplicate`
    /// (same invitation pending, or already friends).
    pub fn create_invitation(&self, inviting: ProfileId, invited: ProfileId) -> Result<InvitationId> {
        surface("create_invitation", self.invitations.create(inviting, invited)).map(|inv| inv.id)
    }

    /// Withdraw a sent invitation. `caller` must be the inviting party.
    pub fn withdraw_invitation(&self, id: InvitationId, caller: ProfileId) -> Result<()> {
        surface("withdraw_invitation", self.invitations.withdraw(id, caller))
    }

    /// Reject a received invitation. `caller` must be the invited party.
    pub fn reject_invitation(&self, id: InvitationId, caller: ProfileId) -> Result<()> {
        surface("reject_invitation", self.invitations.reject(id, caller))
    }

    /// Accept a received invitation. `caller` must be the invited party.
    ///
    /// Creates both friendship edges and retires the invitation, plus the
    /// reverse invitation if one was pending.
    pub fn accept_invitation(&self, id: InvitationId, caller: ProfileId) -> Result<()> {
        surface("accept_invitation", self.invitations.accept(id, caller))
    }

    /// Invitations waiting on `profile`, newest first.
    pub fn list_invitations_received_by(&self, profile: ProfileId) -> Result<Vec<FriendshipInvitation>> {
        surface("list_invitations_received_by", self.invitations.received_by(profile))
    }

    /// Invitations `profile` has sent, newest first.
    pub fn list_invitations_sent_by(&self, profile: ProfileId) -> Result<Vec<FriendshipInvitation>> {
        surface("list_invitations_sent_by", self.invitations.sent_by(profile))
    }

    /// Look up an invitation by id.
    pub fn get_invitation(&self, id: InvitationId) -> Result<Option<FriendshipInvitation>> {
        surface("get_invitation", self.invitations.get(id))
    }

    // =========================================================================
    // Friendships (3)
    // =========================================================================

    /// Unfriend: remove the friendship and its reverse edge.
    ///
    /// `caller` must be the `source` of the edge named by `id`.
    pub fn delete_friendship(&self, id: FriendshipId, caller: ProfileId) -> Result<()> {
        surface("delete_friendship", self.friendships.delete(id, caller))
    }

    /// Friendship edges owned by `profile`, newest first.
    pub fn list_friends_of(&self, profile: ProfileId) -> Result<Vec<Friendship>> {
        surface("list_friends_of", self.friendships.friends_of(profile))
    }

    /// Whether the directed edge `a -> b` exists.
    pub fn friendship_exists(&self, a: ProfileId, b: ProfileId) -> Result<bool> {
        surface("friendship_exists", self.friendships.exists(a, b))
    }

    /// Look up the directed edge `source -> target`.
    pub fn find_friendship(&self, source: ProfileId, target: ProfileId) -> Result<Option<Friendship>> {
        surface("find_friendship", self.friendships.find(source, target))
    }

    // =========================================================================
    // Profiles (4)
    // =========================================================================

    /// Register a profile under its external id.
    pub fn create_profile(&self, id: ProfileId, name: &str) -> Result<Profile> {
        surface("create_profile", self.profiles.create(id, name))
    }

    /// Delete a profile with every invitation and friendship naming it.
    pub fn delete_profile(&self, id: ProfileId) -> Result<CascadeSummary> {
        surface("delete_profile", self.profiles.delete(id))
    }

    /// Look up a profile.
    pub fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>> {
        surface("get_profile", self.profiles.get(id))
    }

    /// Every profile except `viewer`, flagged with whether they are friends.
    pub fn list_profiles_with_friend_flag(&self, viewer: ProfileId) -> Result<Vec<FriendProfile>> {
        surface("list_profiles_with_friend_flag", self.profiles.list_with_friend_flag(viewer))
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Read-only consistency check of the whole graph.
    pub fn audit(&self) -> Result<GraphAudit> {
        surface("audit", self.friendships.audit())
    }

    /// Engine counters.
    pub fn stats(&self) -> DatabaseStats {
        self.db.stats()
    }
}

fn surface<T>(op: &'static str, result: RapportResult<T>) -> Result<T> {
    result.map_err(|err| {
        if err.is_transient() {
            tracing::debug!(op, error = %err, "transient failure returned to caller");
        }
        Error::from(err)
    })
}

impl std::fmt::Debug for Rapport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rapport").field("db", &self.db).finish()
    }
}
