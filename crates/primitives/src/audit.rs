//! Read-only consistency audit of the relationship graph.
//!
//! Scans every profile, invitation and friendship at one snapshot and
//! reports anything that breaks the graph invariants. It never repairs.

use std::collections::HashSet;
use std::fmt;

use rapport_core::{EntityRef, ProfileId, RapportResult, Space, Value};

use crate::codec::decode;
use crate::keys;
use crate::types::{Friendship, FriendshipInvitation, Profile};
use crate::FriendshipGraph;

/// Findings of [`FriendshipGraph::audit`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphAudit {
    /// Profiles scanned
    pub profiles: usize,
    /// Directed friendship edges scanned
    pub friendships: usize,
    /// Pending invitations scanned
    pub invitations: usize,
    /// Edges `(source, target)` without a `(target, source)` counterpart
    pub asymmetric: Vec<(ProfileId, ProfileId)>,
    /// Edges or invitations from a profile to itself
    pub self_loops: Vec<EntityRef>,
    /// Edges or invitations naming a missing profile
    pub dangling: Vec<EntityRef>,
    /// Invitations `(inviting, invited)` whose pair is already friends
    pub invitations_with_friendship: Vec<(ProfileId, ProfileId)>,
    /// Id or received-index entries that do not match a record
    pub broken_indexes: Vec<String>,
}

impl GraphAudit {
    /// True if no invariant is broken
    pub fn is_consistent(&self) -> bool {
        self.asymmetric.is_empty()
            && self.self_loops.is_empty()
            && self.dangling.is_empty()
            && self.invitations_with_friendship.is_empty()
            && self.broken_indexes.is_empty()
    }
}

impl fmt::Display for GraphAudit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "profiles: {}, friendships: {} ({} pairs), invitations: {}",
            self.profiles,
            self.friendships,
            self.friendships / 2,
            self.invitations
        )?;
        if self.is_consistent() {
            return write!(f, "consistent");
        }
        for (s, t) in &self.asymmetric {
            writeln!(f, "asymmetric edge {} -> {}", s, t)?;
        }
        for entity in &self.self_loops {
            writeln!(f, "self loop: {}", entity)?;
        }
        for entity in &self.dangling {
            writeln!(f, "dangling: {}", entity)?;
        }
        for (i, j) in &self.invitations_with_friendship {
            writeln!(f, "invitation {} -> {} between friends", i, j)?;
        }
        for key in &self.broken_indexes {
            writeln!(f, "broken index: {}", key)?;
        }
        Ok(())
    }
}

impl FriendshipGraph {
    /// Scan the whole graph at one snapshot and report invariant violations.
    pub fn audit(&self) -> RapportResult<GraphAudit> {
        self.database().transaction(|txn| {
            let mut audit = GraphAudit::default();

            let profiles: HashSet<ProfileId> = txn
                .scan_prefix(&keys::space_prefix(Space::Profile))?
                .iter()
                .map(|(_, value)| decode::<Profile>(value).map(|p| p.id))
                .collect::<RapportResult<_>>()?;
            audit.profiles = profiles.len();

            let edges: Vec<Friendship> = txn
                .scan_prefix(&keys::space_prefix(Space::Friendship))?
                .iter()
                .map(|(_, value)| decode(value))
                .collect::<RapportResult<_>>()?;
            audit.friendships = edges.len();
            let pairs: HashSet<(ProfileId, ProfileId)> =
                edges.iter().map(|e| (e.source, e.target)).collect();

            for edge in &edges {
                let entity = EntityRef::FriendshipPair {
                    source: edge.source,
                    target: edge.target,
                };
                if edge.source == edge.target {
                    audit.self_loops.push(entity.clone());
                }
                if !pairs.contains(&(edge.target, edge.source)) {
                    audit.asymmetric.push((edge.source, edge.target));
                }
                if !profiles.contains(&edge.source) || !profiles.contains(&edge.target) {
                    audit.dangling.push(entity);
                }
                let indexed = txn.get(&keys::friendship_id_key(edge.id))?;
                if indexed != Some(Value::String(keys::pair(edge.source, edge.target))) {
                    audit
                        .broken_indexes
                        .push(keys::friendship_id_key(edge.id).to_string());
                }
            }

            let invitations: Vec<FriendshipInvitation> = txn
                .scan_prefix(&keys::space_prefix(Space::Invitation))?
                .iter()
                .map(|(_, value)| decode(value))
                .collect::<RapportResult<_>>()?;
            audit.invitations = invitations.len();

            for inv in &invitations {
                let entity = EntityRef::InvitationPair {
                    inviting: inv.inviting,
                    invited: inv.invited,
                };
                if inv.inviting == inv.invited {
                    audit.self_loops.push(entity.clone());
                }
                if !profiles.contains(&inv.inviting) || !profiles.contains(&inv.invited) {
                    audit.dangling.push(entity);
                }
                if pairs.contains(&(inv.inviting, inv.invited)) {
                    audit
                        .invitations_with_friendship
                        .push((inv.inviting, inv.invited));
                }
                let by_id = txn.get(&keys::invitation_id_key(inv.id))?;
                if by_id != Some(Value::String(keys::pair(inv.inviting, inv.invited))) {
                    audit
                        .broken_indexes
                        .push(keys::invitation_id_key(inv.id).to_string());
                }
                let received = keys::invitation_received_key(inv.invited, inv.inviting);
                if txn.get(&received)? != Some(Value::String(inv.id.to_string())) {
                    audit.broken_indexes.push(received.to_string());
                }
            }

            let received_index = txn.scan_prefix(&keys::space_prefix(Space::InvitationReceived))?;
            if received_index.len() != invitations.len() {
                let expected: HashSet<String> = invitations
                    .iter()
                    .map(|inv| keys::pair(inv.invited, inv.inviting))
                    .collect();
                for (key, _) in received_index {
                    if !expected.contains(key.user_key()) {
                        audit.broken_indexes.push(key.to_string());
                    }
                }
            }

            Ok(audit)
        })
    }
}
