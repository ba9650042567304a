//! Rapport: a transactional friendship graph
//!
//! Profiles send directed invitations; accepting one materializes a
//! symmetric pair of friendship edges. Every operation runs in a single
//! optimistic transaction, so the stored graph never becomes asymmetric,
//! self-looping or duplicated, even when requests race.
//!
//! ```ignore
//! let rapport = Rapport::cache();
//! rapport.create_profile(alice, "Alice")?;
//! rapport.create_profile(bob, "Bob")?;
//!
//! let invitation = rapport.create_invitation(alice, bob)?;
//! rapport.accept_invitation(invitation, bob)?;
//! assert!(rapport.friendship_exists(alice, bob)?);
//! assert!(rapport.friendship_exists(bob, alice)?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod api;
mod error;
pub mod types;

pub use api::Rapport;
pub use error::{Error, Result};
pub use types::*;
