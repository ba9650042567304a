//! Primitives layer for Rapport
//!
//! This crate implements the relationship primitives:
//! - Profile Store: principals, with cascade on delete
//! - Invitation Ledger: directed pending requests and their transitions
//! - Friendship Graph: symmetric friendship edges and the graph audit
//!
//! All primitives are stateless facades over the Database engine. Every
//! operation runs in exactly one transaction; cross-record invariants rely
//! on the engine's optimistic validation, not on locks held here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
mod codec;
pub mod friendships;
pub mod invitations;
pub mod keys;
pub mod profiles;
pub mod types;

pub use audit::GraphAudit;
pub use friendships::FriendshipGraph;
pub use invitations::{Invitation, InvitationKind, InvitationLedger};
pub use profiles::{CascadeSummary, ProfileStore};
pub use types::{FriendProfile, Friendship, FriendshipInvitation, Profile};
