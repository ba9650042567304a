//! Tier 3: Profile delete cascade

use crate::test_utils::*;
use rapport::{CascadeSummary, Error, ProfileId};

#[test]
fn delete_profile_removes_everything_naming_it() {
    let rapport = graph();
    let [a, b, c, d, e] = profile_set::<5>(&rapport);
    befriend(&rapport, a, b);
    befriend(&rapport, c, a);
    rapport.create_invitation(a, d).unwrap();
    rapport.create_invitation(e, a).unwrap();
    rapport.create_invitation(d, a).unwrap();
    let kept = rapport.create_invitation(b, c).unwrap();

    let summary = rapport.delete_profile(a).unwrap();

    assert_eq!(
        summary,
        CascadeSummary {
            invitations_sent: 1,
            invitations_received: 2,
            friendships: 2,
        }
    );
    assert!(rapport.get_profile(a).unwrap().is_none());
    for other in [b, c, d, e] {
        assert_pair(&rapport, a, other, false);
        assert!(rapport
            .list_invitations_received_by(other)
            .unwrap()
            .iter()
            .all(|inv| inv.inviting != a));
        assert!(rapport
            .list_invitations_sent_by(other)
            .unwrap()
            .iter()
            .all(|inv| inv.invited != a));
    }
    assert!(rapport.get_invitation(kept).unwrap().is_some());
    assert_consistent(&rapport);
}

#[test]
fn deleted_profile_cannot_be_invited() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    rapport.delete_profile(b).unwrap();

    assert!(matches!(
        rapport.create_invitation(a, b).unwrap_err(),
        Error::NotFound { .. }
    ));
}

#[test]
fn pending_invitation_from_deleted_profile_is_gone() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();
    rapport.delete_profile(a).unwrap();

    assert!(matches!(
        rapport.accept_invitation(id, b).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert!(rapport.list_invitations_received_by(b).unwrap().is_empty());
}

#[test]
fn delete_missing_profile_is_not_found() {
    let rapport = graph();
    assert!(matches!(
        rapport.delete_profile(ProfileId::new()).unwrap_err(),
        Error::NotFound { .. }
    ));
}

#[test]
fn recreated_profile_starts_clean() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    befriend(&rapport, a, b);
    rapport.delete_profile(a).unwrap();

    rapport.create_profile(a, "again").unwrap();

    assert_pair(&rapport, a, b, false);
    assert!(rapport.list_friends_of(a).unwrap().is_empty());
    assert_consistent(&rapport);
}
