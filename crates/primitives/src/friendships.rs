//! Friendship graph primitive
//!
//! Stateless facade over the Database engine. A friendship is stored as two
//! directed rows, `Friendship:{a}/{b}` and `Friendship:{b}/{a}`, each with
//! an id index entry. Only two functions write those rows:
//!
//! - [`link_pair`]: create-if-absent for both directions (used by accept)
//! - [`unlink_pair`]: remove both directions (used by unfriend and cascade)
//!
//! Keeping pairing in these two functions is what keeps the graph
//! symmetric; there is no repair job.

use std::sync::Arc;

use rapport_concurrency::TransactionContext;
use rapport_core::{
    EntityRef, FriendshipId, ProfileId, RapportError, RapportResult, Value,
};
use rapport_engine::Database;

use crate::codec::{decode, decode_opt, encode};
use crate::keys;
use crate::types::{newest_updated_first, Friendship};

// =============================================================================
// Pair primitives (transaction-scoped)
// =============================================================================

/// Read one directed edge inside `txn`.
pub(crate) fn find_in(
    txn: &mut TransactionContext,
    source: ProfileId,
    target: ProfileId,
) -> RapportResult<Option<Friendship>> {
    decode_opt(txn.get(&keys::friendship_key(source, target))?)
}

fn ensure_edge(
    txn: &mut TransactionContext,
    source: ProfileId,
    target: ProfileId,
) -> RapportResult<Friendship> {
    if let Some(existing) = find_in(txn, source, target)? {
        return Ok(existing);
    }
    let edge = Friendship::new(source, target);
    txn.put(keys::friendship_key(source, target), encode(&edge)?)?;
    txn.put(
        keys::friendship_id_key(edge.id),
        Value::String(keys::pair(source, target)),
    )?;
    Ok(edge)
}

fn remove_edge(
    txn: &mut TransactionContext,
    source: ProfileId,
    target: ProfileId,
) -> RapportResult<bool> {
    match find_in(txn, source, target)? {
        Some(edge) => {
            txn.delete(keys::friendship_key(source, target))?;
            txn.delete(keys::friendship_id_key(edge.id))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Ensure both `Friendship(a, b)` and `Friendship(b, a)` exist.
///
/// Existing edges are kept as they are. Returns `(a -> b, b -> a)`.
pub(crate) fn link_pair(
    txn: &mut TransactionContext,
    a: ProfileId,
    b: ProfileId,
) -> RapportResult<(Friendship, Friendship)> {
    if a == b {
        return Err(RapportError::self_reference(EntityRef::FriendshipPair {
            source: a,
            target: b,
        }));
    }
    let forward = ensure_edge(txn, a, b)?;
    let reverse = ensure_edge(txn, b, a)?;
    Ok((forward, reverse))
}

/// Remove both directions of the pair `{a, b}`.
///
/// A missing edge in either direction is not an error. Returns whether
/// anything was removed.
pub(crate) fn unlink_pair(
    txn: &mut TransactionContext,
    a: ProfileId,
    b: ProfileId,
) -> RapportResult<bool> {
    let forward = remove_edge(txn, a, b)?;
    let reverse = remove_edge(txn, b, a)?;
    Ok(forward || reverse)
}

/// Every edge owned by `source`, inside `txn`.
pub(crate) fn friends_of_in(
    txn: &mut TransactionContext,
    source: ProfileId,
) -> RapportResult<Vec<Friendship>> {
    txn.scan_prefix(&keys::friendships_from_prefix(source))?
        .into_iter()
        .map(|(_, value)| decode(&value))
        .collect()
}

// =============================================================================
// Facade
// =============================================================================

/// Friendship graph primitive
///
/// Holds only an `Arc<Database>`; clone is cheap. Friendships are never
/// created directly: accepting an invitation is the only way in.
#[derive(Clone)]
pub struct FriendshipGraph {
    db: Arc<Database>,
}

impl FriendshipGraph {
    /// Create a new FriendshipGraph backed by the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The shared database handle.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Check whether the directed edge `source -> target` exists.
    pub fn exists(&self, source: ProfileId, target: ProfileId) -> RapportResult<bool> {
        self.db
            .transaction(|txn| txn.exists(&keys::friendship_key(source, target)))
    }

    /// Look up an edge by its id.
    pub fn get(&self, id: FriendshipId) -> RapportResult<Option<Friendship>> {
        self.db.transaction(|txn| get_in(txn, id))
    }

    /// Look up the directed edge `source -> target`.
    pub fn find(&self, source: ProfileId, target: ProfileId) -> RapportResult<Option<Friendship>> {
        self.db.transaction(|txn| find_in(txn, source, target))
    }

    /// Remove a friendship and its reverse edge.
    ///
    /// Only the edge's `source` may delete it through this edge's id; the
    /// other party uses the id of their own direction.
    pub fn delete(&self, id: FriendshipId, caller: ProfileId) -> RapportResult<()> {
        let edge = self.db.transaction(|txn| {
            let edge = get_in(txn, id)?
                .ok_or_else(|| RapportError::not_found(EntityRef::Friendship(id)))?;
            if edge.source != caller {
                return Err(RapportError::forbidden(EntityRef::Friendship(id), caller));
            }
            unlink_pair(txn, edge.source, edge.target)?;
            Ok(edge)
        })?;

        tracing::info!(
            source = %edge.source,
            target = %edge.target,
            "friendship pair removed"
        );
        Ok(())
    }

    /// Every edge owned by `profile`, newest `updated_at` first.
    pub fn friends_of(&self, profile: ProfileId) -> RapportResult<Vec<Friendship>> {
        let mut edges = self.db.transaction(|txn| friends_of_in(txn, profile))?;
        newest_updated_first(&mut edges, |e| e.updated_at, |e| e.id);
        Ok(edges)
    }
}

fn get_in(txn: &mut TransactionContext, id: FriendshipId) -> RapportResult<Option<Friendship>> {
    let pair = match txn.get(&keys::friendship_id_key(id))? {
        Some(Value::String(pair)) => pair,
        Some(other) => {
            return Err(RapportError::serialization(format!(
                "friendship index holds {}",
                other.type_name()
            )))
        }
        None => return Ok(None),
    };
    let (source, target) = keys::parse_pair(&pair)?;
    Ok(find_in(txn, source, target)?.filter(|edge| edge.id == id))
}
