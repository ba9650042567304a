//! Tier 2: Accept transitions

use crate::test_utils::*;
use rapport::Error;

#[test]
fn accept_creates_both_directions_and_retires_invitation() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();

    rapport.accept_invitation(id, b).unwrap();

    assert_pair(&rapport, a, b, true);
    assert!(rapport.get_invitation(id).unwrap().is_none());
    assert!(rapport.list_invitations_received_by(b).unwrap().is_empty());
    assert!(rapport.list_invitations_sent_by(a).unwrap().is_empty());

    let forward = rapport.find_friendship(a, b).unwrap().unwrap();
    let reverse = rapport.find_friendship(b, a).unwrap().unwrap();
    assert_ne!(forward.id, reverse.id);
    assert_eq!((forward.source, forward.target), (a, b));
    assert_eq!((reverse.source, reverse.target), (b, a));
    assert_consistent(&rapport);
}

#[test]
fn accept_retires_pending_reverse_invitation() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let ab = rapport.create_invitation(a, b).unwrap();
    let ba = rapport.create_invitation(b, a).unwrap();

    rapport.accept_invitation(ab, b).unwrap();

    assert_pair(&rapport, a, b, true);
    for p in [a, b] {
        assert!(rapport.list_invitations_sent_by(p).unwrap().is_empty());
        assert!(rapport.list_invitations_received_by(p).unwrap().is_empty());
    }
    assert!(matches!(
        rapport.accept_invitation(ba, a).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert_eq!(rapport.list_friends_of(a).unwrap().len(), 1);
    assert_eq!(rapport.list_friends_of(b).unwrap().len(), 1);
    assert_consistent(&rapport);
}

#[test]
fn accepting_the_reverse_side_is_equivalent() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    rapport.create_invitation(a, b).unwrap();
    let ba = rapport.create_invitation(b, a).unwrap();

    rapport.accept_invitation(ba, a).unwrap();

    assert_pair(&rapport, a, b, true);
    assert!(rapport.list_invitations_received_by(b).unwrap().is_empty());
    assert_consistent(&rapport);
}

#[test]
fn second_accept_is_not_found_and_changes_nothing() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();
    rapport.accept_invitation(id, b).unwrap();
    let before = rapport.find_friendship(a, b).unwrap();

    assert!(matches!(
        rapport.accept_invitation(id, b).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert_eq!(rapport.find_friendship(a, b).unwrap(), before);
}

#[test]
fn accept_leaves_other_invitations_alone() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    let ab = rapport.create_invitation(a, b).unwrap();
    let cb = rapport.create_invitation(c, b).unwrap();
    let ac = rapport.create_invitation(a, c).unwrap();

    rapport.accept_invitation(ab, b).unwrap();

    let received: Vec<_> = rapport
        .list_invitations_received_by(b)
        .unwrap()
        .into_iter()
        .map(|inv| inv.id)
        .collect();
    assert_eq!(received, vec![cb]);
    assert_eq!(rapport.list_invitations_sent_by(a).unwrap()[0].id, ac);
    assert_pair(&rapport, c, b, false);
}

#[test]
fn friend_flag_listing_reflects_accept() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    befriend(&rapport, a, b);

    let listed = rapport.list_profiles_with_friend_flag(a).unwrap();

    assert_eq!(listed.len(), 2);
    let flag = |id| listed.iter().find(|fp| fp.profile.id == id).unwrap().is_friend;
    assert!(flag(b));
    assert!(!flag(c));
}
