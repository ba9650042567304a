//! Tier 1: Invitation invariants
//!
//! No self loops, one pending invitation per ordered pair, and only the
//! entitled party may move an invitation along.

use crate::test_utils::*;
use rapport::{Error, InvitationId, ProfileId};

#[test]
fn self_invitation_is_rejected() {
    let rapport = graph();
    let a = profile(&rapport, "a");

    let err = rapport.create_invitation(a, a).unwrap_err();

    assert!(matches!(err, Error::SelfReference { .. }));
    assert!(rapport.list_invitations_sent_by(a).unwrap().is_empty());
}

#[test]
fn second_invitation_for_same_pair_is_duplicate() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);

    rapport.create_invitation(a, b).unwrap();
    let err = rapport.create_invitation(a, b).unwrap_err();

    assert!(matches!(err, Error::Duplicate { .. }));
    assert_eq!(rapport.list_invitations_received_by(b).unwrap().len(), 1);
}

#[test]
fn reverse_invitation_is_a_different_pair() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);

    rapport.create_invitation(a, b).unwrap();
    rapport.create_invitation(b, a).unwrap();

    assert_eq!(rapport.list_invitations_sent_by(a).unwrap().len(), 1);
    assert_eq!(rapport.list_invitations_received_by(a).unwrap().len(), 1);
    assert_consistent(&rapport);
}

#[test]
fn invitation_between_friends_is_duplicate() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    befriend(&rapport, a, b);

    assert!(matches!(
        rapport.create_invitation(a, b).unwrap_err(),
        Error::Duplicate { .. }
    ));
    assert!(matches!(
        rapport.create_invitation(b, a).unwrap_err(),
        Error::Duplicate { .. }
    ));
}

#[test]
fn invitation_to_missing_profile_is_not_found() {
    let rapport = graph();
    let a = profile(&rapport, "a");
    let ghost = ProfileId::new();

    assert!(matches!(
        rapport.create_invitation(a, ghost).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert!(matches!(
        rapport.create_invitation(ghost, a).unwrap_err(),
        Error::NotFound { .. }
    ));
}

#[test]
fn only_inviting_party_may_withdraw() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();

    for caller in [b, c] {
        let err = rapport.withdraw_invitation(id, caller).unwrap_err();
        assert!(matches!(err, Error::Forbidden { caller: who, .. } if who == caller));
    }
    rapport.withdraw_invitation(id, a).unwrap();

    assert!(rapport.get_invitation(id).unwrap().is_none());
    assert!(rapport.list_invitations_received_by(b).unwrap().is_empty());
}

#[test]
fn only_invited_party_may_accept_or_reject() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();

    for caller in [a, c] {
        assert!(matches!(
            rapport.accept_invitation(id, caller).unwrap_err(),
            Error::Forbidden { .. }
        ));
        assert!(matches!(
            rapport.reject_invitation(id, caller).unwrap_err(),
            Error::Forbidden { .. }
        ));
    }
    assert!(rapport.get_invitation(id).unwrap().is_some());

    rapport.reject_invitation(id, b).unwrap();
    assert_pair(&rapport, a, b, false);
    assert!(rapport.list_invitations_sent_by(a).unwrap().is_empty());
}

#[test]
fn unknown_invitation_is_not_found() {
    let rapport = graph();
    let a = profile(&rapport, "a");
    let id = InvitationId::new();

    assert!(matches!(rapport.accept_invitation(id, a).unwrap_err(), Error::NotFound { .. }));
    assert!(matches!(rapport.reject_invitation(id, a).unwrap_err(), Error::NotFound { .. }));
    assert!(matches!(rapport.withdraw_invitation(id, a).unwrap_err(), Error::NotFound { .. }));
}

#[test]
fn withdrawn_pair_can_be_invited_again() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let first = rapport.create_invitation(a, b).unwrap();
    rapport.withdraw_invitation(first, a).unwrap();

    let second = rapport.create_invitation(a, b).unwrap();

    assert_ne!(first, second);
    assert_eq!(
        rapport.list_invitations_received_by(b).unwrap()[0].id,
        second
    );
}

#[test]
fn received_listing_is_newest_first() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    let older = rapport.create_invitation(a, c).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let newer = rapport.create_invitation(b, c).unwrap();

    let ids: Vec<InvitationId> = rapport
        .list_invitations_received_by(c)
        .unwrap()
        .into_iter()
        .map(|inv| inv.id)
        .collect();

    assert_eq!(ids, vec![newer, older]);
}
