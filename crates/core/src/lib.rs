//! Core types for Rapport
//!
//! This crate defines the foundational types shared by every layer:
//! - Identifiers: ProfileId, InvitationId, FriendshipId
//! - Storage keys: Space, Key
//! - Values: Value, VersionedValue
//! - Errors: RapportError, EntityRef
//! - Traits: Storage (the read interface used by commit validation)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{EntityRef, RapportError, RapportResult};
pub use traits::Storage;
pub use types::{FriendshipId, InvitationId, Key, ProfileId, Space, Timestamp};
pub use value::{Value, VersionedValue};
