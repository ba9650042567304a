//! Tier 4: Concurrent races
//!
//! Threads share one `Rapport` and start together on a barrier. Racing
//! transitions on the same pair either observe the winner's outcome or
//! fail with a transient error; the graph is consistent afterwards.

use crate::test_utils::*;
use rapport::{Error, ProfileId, Rapport};
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

fn race<T, F>(rapport: &Rapport, f: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(Rapport, usize) -> T + Send + Sync + 'static,
{
    let barrier = Arc::new(Barrier::new(THREADS));
    let f = Arc::new(f);
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let rapport = rapport.clone();
            let barrier = Arc::clone(&barrier);
            let f = Arc::clone(&f);
            thread::spawn(move || {
                barrier.wait();
                f(rapport, i)
            })
        })
        .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

fn tally<T>(results: &[Result<T, Error>]) -> HashMap<&'static str, usize> {
    let mut counts = HashMap::new();
    for result in results {
        let tag = match result {
            Ok(_) => "ok",
            Err(err) => kind(err),
        };
        *counts.entry(tag).or_insert(0) += 1;
    }
    counts
}

#[test]
fn racing_creates_for_one_pair_admit_exactly_one() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);

    let results = race(&rapport, move |r, _| r.create_invitation(a, b));

    let counts = tally(&results);
    assert_eq!(counts.get("ok"), Some(&1), "{counts:?}");
    assert_eq!(
        counts.get("duplicate").unwrap_or(&0) + counts.get("transient").unwrap_or(&0),
        THREADS - 1,
        "{counts:?}"
    );
    assert_eq!(rapport.list_invitations_received_by(b).unwrap().len(), 1);
    assert_consistent(&rapport);
}

#[test]
fn racing_accepts_produce_one_pair() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();

    let results = race(&rapport, move |r, _| r.accept_invitation(id, b));

    let counts = tally(&results);
    assert_eq!(counts.get("ok"), Some(&1), "{counts:?}");
    assert_eq!(
        counts.get("not_found").unwrap_or(&0) + counts.get("transient").unwrap_or(&0),
        THREADS - 1,
        "{counts:?}"
    );
    assert_pair(&rapport, a, b, true);
    assert_eq!(rapport.list_friends_of(a).unwrap().len(), 1);
    assert!(rapport.get_invitation(id).unwrap().is_none());

    // a transient loser retried now sees the invitation gone
    assert!(matches!(
        rapport.accept_invitation(id, b).unwrap_err(),
        Error::NotFound { .. }
    ));
    assert_consistent(&rapport);
}

#[test]
fn crossed_invitations_accepted_concurrently() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let ab = rapport.create_invitation(a, b).unwrap();
    let ba = rapport.create_invitation(b, a).unwrap();

    let results = race(&rapport, move |r, i| {
        if i % 2 == 0 {
            r.accept_invitation(ab, b)
        } else {
            r.accept_invitation(ba, a)
        }
    });

    assert_eq!(tally(&results).get("ok"), Some(&1));
    assert_pair(&rapport, a, b, true);
    for p in [a, b] {
        assert!(rapport.list_invitations_received_by(p).unwrap().is_empty());
        assert_eq!(rapport.list_friends_of(p).unwrap().len(), 1);
    }
    assert_consistent(&rapport);
}

#[test]
fn racing_bilateral_unfriend_removes_pair_once() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    befriend(&rapport, a, b);
    let ab = rapport.find_friendship(a, b).unwrap().unwrap().id;
    let ba = rapport.find_friendship(b, a).unwrap().unwrap().id;

    let results = race(&rapport, move |r, i| {
        if i % 2 == 0 {
            r.delete_friendship(ab, a)
        } else {
            r.delete_friendship(ba, b)
        }
    });

    let counts = tally(&results);
    assert_eq!(counts.get("ok"), Some(&1), "{counts:?}");
    assert_eq!(
        counts.get("not_found").unwrap_or(&0) + counts.get("transient").unwrap_or(&0),
        THREADS - 1,
        "{counts:?}"
    );
    assert_pair(&rapport, a, b, false);
    for p in [a, b] {
        assert!(rapport.list_friends_of(p).unwrap().is_empty());
    }
    assert_consistent(&rapport);
}

#[test]
fn racing_accept_and_withdraw_pick_one_outcome() {
    let rapport = graph();
    let [a, b] = profile_set::<2>(&rapport);
    let id = rapport.create_invitation(a, b).unwrap();

    let results = race(&rapport, move |r, i| {
        if i % 2 == 0 {
            (true, r.accept_invitation(id, b))
        } else {
            (false, r.withdraw_invitation(id, a))
        }
    });

    let outcomes: Vec<_> = results.iter().map(|(_, result)| result.clone()).collect();
    let counts = tally(&outcomes);
    assert_eq!(counts.get("ok"), Some(&1), "{counts:?}");
    assert_eq!(
        counts.get("not_found").unwrap_or(&0) + counts.get("transient").unwrap_or(&0),
        THREADS - 1,
        "{counts:?}"
    );

    let accepted = results
        .iter()
        .any(|(is_accept, result)| *is_accept && result.is_ok());
    assert_pair(&rapport, a, b, accepted);
    assert!(rapport.get_invitation(id).unwrap().is_none());
    assert!(rapport.list_invitations_received_by(b).unwrap().is_empty());
    assert!(rapport.list_invitations_sent_by(a).unwrap().is_empty());
    assert_consistent(&rapport);
}

#[test]
fn cascade_racing_invitations_leaves_nothing_dangling() {
    let rapport = graph();
    let victim = profile(&rapport, "victim");
    let others: Vec<ProfileId> = profiles(&rapport, THREADS);
    let others = Arc::new(others);

    let shared = Arc::clone(&others);
    let results = race(&rapport, move |r, i| {
        if i == 0 {
            r.delete_profile(victim).map(|_| ())
        } else {
            r.create_invitation(shared[i], victim).map(|_| ())
        }
    });

    let deleted = results[0].is_ok();
    if deleted {
        assert!(rapport.get_profile(victim).unwrap().is_none());
        assert!(rapport.list_invitations_received_by(victim).unwrap().is_empty());
    }
    for result in &results[1..] {
        if let Err(err) = result {
            assert!(
                matches!(err, Error::NotFound { .. } | Error::Transient { .. }),
                "{err}"
            );
        }
    }
    assert_consistent(&rapport);
}

#[test]
fn disjoint_pairs_never_conflict() {
    let rapport = graph();
    let people: Vec<ProfileId> = profiles(&rapport, THREADS * 2);
    let people = Arc::new(people);

    let shared = Arc::clone(&people);
    let results = race(&rapport, move |r, i| {
        let (a, b) = (shared[2 * i], shared[2 * i + 1]);
        let id = r.create_invitation(a, b)?;
        r.accept_invitation(id, b)
    });

    assert!(results.iter().all(|r| r.is_ok()), "{:?}", tally(&results));
    for pair in people.chunks(2) {
        assert_pair(&rapport, pair[0], pair[1], true);
    }
    assert_eq!(rapport.stats().conflicts, 0);
    assert_consistent(&rapport);
}

#[test]
fn mixed_workload_with_retries_stays_symmetric() {
    let rapport = graph();
    let people = Arc::new(profiles(&rapport, 6));

    let shared = Arc::clone(&people);
    race(&rapport, move |r, t| {
        for step in 0..60 {
            let a = shared[(t + step) % shared.len()];
            let b = shared[(t * 7 + step * 3 + 1) % shared.len()];
            for _ in 0..16 {
                let outcome = match step % 4 {
                    0 | 1 => r.create_invitation(a, b).map(|_| ()),
                    2 => match r.list_invitations_received_by(b) {
                        Ok(received) => match received.first() {
                            Some(inv) => r.accept_invitation(inv.id, b),
                            None => Ok(()),
                        },
                        Err(err) => Err(err),
                    },
                    _ => match r.find_friendship(a, b) {
                        Ok(Some(edge)) => r.delete_friendship(edge.id, a),
                        Ok(None) => Ok(()),
                        Err(err) => Err(err),
                    },
                };
                match outcome {
                    Err(err) if err.is_retryable() => continue,
                    _ => break,
                }
            }
        }
    });

    for &a in people.iter() {
        for edge in rapport.list_friends_of(a).unwrap() {
            assert!(rapport.friendship_exists(edge.target, a).unwrap());
        }
    }
    assert_consistent(&rapport);
}
