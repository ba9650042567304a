//! Tier 3: Unfriend

use crate::test_utils::*;
use rapport::{Error, FriendshipId};

#[test]
fn delete_by_either_edge_removes_both() {
    for from_reverse in [false, true] {
        let rapport = graph();
        let [a, b] = profile_set::<2>(&rapport);
        befriend(&rapport, a, b);

        let (owner, other) = if from_reverse { (b, a) } else { (a, b) };
        let edge = rapport.find_friendship(owner, other).unwrap().unwrap();
        rapport.delete_friendship(edge.id, owner).unwrap();

        assert_pair(&rapport, a, b, false);
        assert!(rapport.list_friends_of(a).unwrap().is_empty());
        assert!(rapport.list_friends_of(b).unwrap().is_empty());
        assert_consistent(&rapport);
    }
}

#[test]
fn only_the_source_may_delete_an_edge() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    befriend(&rapport, a, b);
    let edge = rapport.find_friendship(a, b).unwrap().unwrap();

    for caller in [b, c] {
        assert!(matches!(
            rapport.delete_friendship(edge.id, caller).unwrap_err(),
            Error::Forbidden { .. }
        ));
    }
    assert_pair(&rapport, a, b, true);
}

#[test]
fn deleting_twice_is_not_found() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    befriend(&rapport, a, b);
    let forward = rapport.find_friendship(a, b).unwrap().unwrap();
    let reverse = rapport.find_friendship(b, a).unwrap().unwrap();

    rapport.delete_friendship(forward.id, a).unwrap();

    assert!(matches!(
        rapport.delete_friendship(forward.id, a).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert!(matches!(
        rapport.delete_friendship(reverse.id, b).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert!(matches!(
        rapport.delete_friendship(FriendshipId::new(), a).unwrap_err(),
        Error::NotFound { .. }
    ));
}

#[test]
fn unfriended_pair_can_befriend_again() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    befriend(&rapport, a, b);
    let old = rapport.find_friendship(a, b).unwrap().unwrap();
    rapport.delete_friendship(old.id, a).unwrap();

    befriend(&rapport, b, a);

    let new = rapport.find_friendship(a, b).unwrap().unwrap();
    assert_ne!(old.id, new.id);
    assert_pair(&rapport, a, b, true);
    assert_consistent(&rapport);
}

#[test]
fn unfriend_leaves_other_friendships() {
    let rapport = graph();
    let [a, b, c] = profile_set::<3>(&rapport);
    befriend(&rapport, a, b);
    befriend(&rapport, a, c);
    let ab = rapport.find_friendship(a, b).unwrap().unwrap();

    rapport.delete_friendship(ab.id, a).unwrap();

    assert_pair(&rapport, a, b, false);
    assert_pair(&rapport, a, c, true);
    let friends: Vec<_> = rapport
        .list_friends_of(a)
        .unwrap()
        .into_iter()
        .map(|edge| edge.target)
        .collect();
    assert_eq!(friends, vec![c]);
}
