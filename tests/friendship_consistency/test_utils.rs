//! Shared helpers for the friendship consistency suite.

#![allow(dead_code)]

use rapport::{Error, ProfileId, Rapport};

/// Fresh in-memory graph.
pub fn graph() -> Rapport {
    Rapport::cache()
}

/// Create a profile with a generated id.
pub fn profile(rapport: &Rapport, name: &str) -> ProfileId {
    let id = ProfileId::new();
    rapport.create_profile(id, name).unwrap();
    id
}

/// Create `n` profiles named `p0..pn`.
pub fn profiles(rapport: &Rapport, n: usize) -> Vec<ProfileId> {
    (0..n).map(|i| profile(rapport, &format!("p{i}"))).collect()
}

/// Invite and accept, leaving `a` and `b` friends.
pub fn befriend(rapport: &Rapport, a: ProfileId, b: ProfileId) {
    let id = rapport.create_invitation(a, b).unwrap();
    rapport.accept_invitation(id, b).unwrap();
}

/// Both directed edges present, or both absent.
pub fn assert_pair(rapport: &Rapport, a: ProfileId, b: ProfileId, friends: bool) {
    assert_eq!(rapport.friendship_exists(a, b).unwrap(), friends, "{a} -> {b}");
    assert_eq!(rapport.friendship_exists(b, a).unwrap(), friends, "{b} -> {a}");
}

/// Run the audit and fail with its report if anything is off.
pub fn assert_consistent(rapport: &Rapport) {
    let audit = rapport.audit().unwrap();
    assert!(audit.is_consistent(), "{audit}");
}

/// Domain outcome or transient failure, as a short tag.
pub fn kind(err: &Error) -> &'static str {
    match err {
        Error::SelfReference { .. } => "self_reference",
        Error::Duplicate { .. } => "duplicate",
        Error::NotFound { .. } => "not_found",
        Error::Forbidden { .. } => "forbidden",
        Error::Transient { .. } => "transient",
        Error::InvalidInput { .. } => "invalid_input",
        Error::Internal { .. } => "internal",
    }
}

/// Create exactly `N` profiles.
pub fn profile_set<const N: usize>(rapport: &Rapport) -> [ProfileId; N] {
    std::array::from_fn(|i| profile(rapport, &format!("p{i}")))
}
