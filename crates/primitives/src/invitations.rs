//! Invitation ledger primitive
//!
//! Stateless facade over the Database engine. An invitation is a directed
//! pending request keyed by its ordered pair, so at most one can exist per
//! `(inviting, invited)`. Two racing creates write the same key and the
//! second committer fails validation.
//!
//! Each invitation occupies three keys that are always written and removed
//! together:
//! - `Invitation:{inviting}/{invited}`: the record
//! - `InvitationById:{id}`: the pair, for lookups by handle
//! - `InvitationReceived:{invited}/{inviting}`: the id, for received lists

use std::sync::Arc;

use rapport_concurrency::TransactionContext;
use rapport_core::{EntityRef, InvitationId, ProfileId, RapportError, RapportResult, Value};
use rapport_engine::Database;

use crate::codec::{decode, decode_opt, encode};
use crate::friendships;
use crate::keys;
use crate::profiles;
use crate::types::{newest_updated_first, FriendshipInvitation};

// =============================================================================
// Invitation contract
// =============================================================================

/// What accepting an invitation produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvitationKind {
    /// Accepting creates a symmetric friendship pair
    Friendship,
}

/// A directed invitation that resolves into some relationship on accept.
///
/// `accept` runs inside the caller's transaction and must leave the
/// invitation retired. It checks the stored record itself, so a value that
/// was never created through the ledger cannot produce a relationship.
/// Authorization of the accepting caller stays with the ledger.
pub trait Invitation {
    /// Kind of relationship produced on accept
    fn kind(&self) -> InvitationKind;

    /// `(inviting, invited)`
    fn parties(&self) -> (ProfileId, ProfileId);

    /// Materialize the relationship and retire the invitation
    fn accept(&self, txn: &mut TransactionContext) -> RapportResult<()>;
}

impl Invitation for FriendshipInvitation {
    fn kind(&self) -> InvitationKind {
        InvitationKind::Friendship
    }

    fn parties(&self) -> (ProfileId, ProfileId) {
        (self.inviting, self.invited)
    }

    /// Creates both friendship edges (if absent), retires the reverse
    /// invitation if one is pending, then retires this one.
    ///
    /// `NotFound` unless this exact invitation is stored and both parties
    /// are live.
    fn accept(&self, txn: &mut TransactionContext) -> RapportResult<()> {
        let stored = match find_in(txn, self.inviting, self.invited)? {
            Some(stored) if stored.id == self.id => stored,
            _ => return Err(RapportError::not_found(EntityRef::Invitation(self.id))),
        };
        profiles::require_live(txn, stored.inviting)?;
        profiles::require_live(txn, stored.invited)?;

        friendships::link_pair(txn, stored.invited, stored.inviting)?;
        if let Some(reverse) = find_in(txn, stored.invited, stored.inviting)? {
            retire_in(txn, &reverse)?;
        }
        retire_in(txn, &stored)
    }
}

// =============================================================================
// Transaction-scoped helpers
// =============================================================================

/// Read the invitation `inviting -> invited` inside `txn`.
pub(crate) fn find_in(
    txn: &mut TransactionContext,
    inviting: ProfileId,
    invited: ProfileId,
) -> RapportResult<Option<FriendshipInvitation>> {
    decode_opt(txn.get(&keys::invitation_key(inviting, invited))?)
}

/// Delete the three keys of an invitation.
pub(crate) fn retire_in(
    txn: &mut TransactionContext,
    invitation: &FriendshipInvitation,
) -> RapportResult<()> {
    txn.delete(keys::invitation_key(invitation.inviting, invitation.invited))?;
    txn.delete(keys::invitation_id_key(invitation.id))?;
    txn.delete(keys::invitation_received_key(
        invitation.invited,
        invitation.inviting,
    ))?;
    Ok(())
}

/// Invitations sent by `inviting`, in key order.
pub(crate) fn sent_by_in(
    txn: &mut TransactionContext,
    inviting: ProfileId,
) -> RapportResult<Vec<FriendshipInvitation>> {
    txn.scan_prefix(&keys::invitations_sent_prefix(inviting))?
        .into_iter()
        .map(|(_, value)| decode(&value))
        .collect()
}

/// Invitations received by `invited`, in key order.
pub(crate) fn received_by_in(
    txn: &mut TransactionContext,
    invited: ProfileId,
) -> RapportResult<Vec<FriendshipInvitation>> {
    let index = txn.scan_prefix(&keys::invitations_received_prefix(invited))?;
    let mut invitations = Vec::with_capacity(index.len());
    for (key, _) in index {
        let Some((_, inviting)) = keys::parse_pair_key(&key) else {
            return Err(RapportError::internal(format!("malformed index key {}", key)));
        };
        match find_in(txn, inviting, invited)? {
            Some(invitation) => invitations.push(invitation),
            None => {
                tracing::warn!(index = %key, "received index points at a missing invitation");
            }
        }
    }
    Ok(invitations)
}

fn get_in(
    txn: &mut TransactionContext,
    id: InvitationId,
) -> RapportResult<Option<FriendshipInvitation>> {
    let pair = match txn.get(&keys::invitation_id_key(id))? {
        Some(Value::String(pair)) => pair,
        Some(other) => {
            return Err(RapportError::serialization(format!(
                "invitation index holds {}",
                other.type_name()
            )))
        }
        None => return Ok(None),
    };
    let (inviting, invited) = keys::parse_pair(&pair)?;
    Ok(find_in(txn, inviting, invited)?.filter(|inv| inv.id == id))
}

fn require_in(
    txn: &mut TransactionContext,
    id: InvitationId,
) -> RapportResult<FriendshipInvitation> {
    get_in(txn, id)?.ok_or_else(|| RapportError::not_found(EntityRef::Invitation(id)))
}

// =============================================================================
// Facade
// =============================================================================

/// Invitation ledger primitive
///
/// Holds only an `Arc<Database>`; clone is cheap. Every method runs in one
/// transaction.
#[derive(Clone)]
pub struct InvitationLedger {
    db: Arc<Database>,
}

impl InvitationLedger {
    /// Create a new InvitationLedger backed by the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Send an invitation from `inviting` to `invited`.
    ///
    /// # Errors
    ///
    /// - `SelfReference` if both ids are equal
    /// - `NotFound` if either profile is absent
    /// - `Duplicate` if the same ordered invitation is pending, or the
    ///   pair is already friends
    pub fn create(
        &self,
        inviting: ProfileId,
        invited: ProfileId,
    ) -> RapportResult<FriendshipInvitation> {
        if inviting == invited {
            return Err(RapportError::self_reference(EntityRef::InvitationPair {
                inviting,
                invited,
            }));
        }

        let invitation = self.db.transaction(|txn| {
            profiles::require_live(txn, inviting)?;
            profiles::require_live(txn, invited)?;

            if txn.exists(&keys::invitation_key(inviting, invited))? {
                return Err(RapportError::duplicate(EntityRef::InvitationPair {
                    inviting,
                    invited,
                }));
            }
            if txn.exists(&keys::friendship_key(inviting, invited))? {
                return Err(RapportError::duplicate(EntityRef::FriendshipPair {
                    source: inviting,
                    target: invited,
                }));
            }

            let invitation = FriendshipInvitation::new(inviting, invited);
            txn.put(keys::invitation_key(inviting, invited), encode(&invitation)?)?;
            txn.put(
                keys::invitation_id_key(invitation.id),
                Value::String(keys::pair(inviting, invited)),
            )?;
            txn.put(
                keys::invitation_received_key(invited, inviting),
                Value::String(invitation.id.to_string()),
            )?;
            Ok(invitation)
        })?;

        tracing::info!(
            id = %invitation.id,
            inviting = %inviting,
            invited = %invited,
            "invitation created"
        );
        Ok(invitation)
    }

    /// Look up an invitation by id.
    pub fn get(&self, id: InvitationId) -> RapportResult<Option<FriendshipInvitation>> {
        self.db.transaction(|txn| get_in(txn, id))
    }

    /// Withdraw an invitation. Only the inviting party may withdraw.
    pub fn withdraw(&self, id: InvitationId, caller: ProfileId) -> RapportResult<()> {
        self.retire_as(id, caller, |inv| inv.inviting, "invitation withdrawn")
    }

    /// Reject an invitation. Only the invited party may reject.
    pub fn reject(&self, id: InvitationId, caller: ProfileId) -> RapportResult<()> {
        self.retire_as(id, caller, |inv| inv.invited, "invitation rejected")
    }

    /// Remove an invitation without an authorization check.
    pub fn delete(&self, id: InvitationId) -> RapportResult<()> {
        self.db.transaction(|txn| {
            let invitation = require_in(txn, id)?;
            retire_in(txn, &invitation)
        })
    }

    fn retire_as(
        &self,
        id: InvitationId,
        caller: ProfileId,
        entitled: impl Fn(&FriendshipInvitation) -> ProfileId,
        event: &'static str,
    ) -> RapportResult<()> {
        let invitation = self.db.transaction(|txn| {
            let invitation = require_in(txn, id)?;
            if entitled(&invitation) != caller {
                return Err(RapportError::forbidden(EntityRef::Invitation(id), caller));
            }
            retire_in(txn, &invitation)?;
            Ok(invitation)
        })?;

        tracing::info!(
            id = %id,
            inviting = %invitation.inviting,
            invited = %invitation.invited,
            "{}",
            event
        );
        Ok(())
    }

    /// Accept an invitation as `caller`.
    ///
    /// In one transaction: checks that `caller` is the invited party, then
    /// runs [`Invitation::accept`], which also requires both profiles live.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the invitation is gone (including a concurrent
    ///   accept or withdrawal that committed first) or a party was deleted
    /// - `Forbidden` if `caller` is not the invited party
    pub fn accept(&self, id: InvitationId, caller: ProfileId) -> RapportResult<()> {
        let invitation = self.db.transaction(|txn| {
            let invitation = require_in(txn, id)?;
            if invitation.invited != caller {
                return Err(RapportError::forbidden(EntityRef::Invitation(id), caller));
            }
            invitation.accept(txn)?;
            Ok(invitation)
        })?;

        tracing::info!(
            id = %id,
            kind = ?invitation.kind(),
            inviting = %invitation.inviting,
            invited = %invitation.invited,
            "invitation accepted"
        );
        Ok(())
    }

    /// Invitations received by `profile`, newest `updated_at` first.
    pub fn received_by(&self, profile: ProfileId) -> RapportResult<Vec<FriendshipInvitation>> {
        let mut invitations = self.db.transaction(|txn| received_by_in(txn, profile))?;
        newest_updated_first(&mut invitations, |i| i.updated_at, |i| i.id);
        Ok(invitations)
    }

    /// Invitations sent by `profile`, newest `updated_at` first.
    pub fn sent_by(&self, profile: ProfileId) -> RapportResult<Vec<FriendshipInvitation>> {
        let mut invitations = self.db.transaction(|txn| sent_by_in(txn, profile))?;
        newest_updated_first(&mut invitations, |i| i.updated_at, |i| i.id);
        Ok(invitations)
    }

    /// Pending invitations between `a` and `b`, in either direction.
    pub fn between(&self, a: ProfileId, b: ProfileId) -> RapportResult<Vec<FriendshipInvitation>> {
        self.db.transaction(|txn| {
            let forward = find_in(txn, a, b)?;
            let reverse = if a == b { None } else { find_in(txn, b, a)? };
            Ok(forward.into_iter().chain(reverse).collect())
        })
    }
}
