//! Synthetic data generation
//!
//! Creates random profiles, then for each hero a number of invitations to
//! or from randomly sampled profiles. A sample that collides with the
//! graph rules (self, duplicate, already friends) or loses a race is
//! retried with a fresh sample until the retry budget runs out.

use std::fmt;
use std::time::Duration;

use anyhow::bail;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rapport::{Error, ProfileId, Rapport, RetryPolicy};

use crate::SeedArgs;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Dana", "Edsger", "Frances", "Grace", "Hedy", "Ivan",
    "John", "Katherine", "Leslie", "Margaret", "Niklaus", "Ole", "Radia", "Sophie", "Tim", "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Conway", "Dijkstra", "Engelbart", "Goldberg", "Hamilton", "Hopper",
    "Kay", "Knuth", "Lamport", "Liskov", "Matsumoto", "Perlman", "Ritchie", "Sutherland",
    "Thompson", "Turing", "Wilson", "Wirth",
];

/// What a seeding run produced
#[derive(Debug, Default)]
pub struct SeedReport {
    pub profiles: usize,
    pub heroes: Vec<ProfileId>,
    pub invitations: usize,
    pub retries: usize,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "profiles generated: {}", self.profiles)?;
        for hero in &self.heroes {
            writeln!(f, "hero: {}", hero)?;
        }
        write!(
            f,
            "invitations created: {} ({} retries)",
            self.invitations, self.retries
        )
    }
}

#[derive(Clone, Copy)]
enum Direction {
    HeroInvited,
    HeroInviting,
}

fn random_name(rng: &mut StdRng) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Anon");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Ymous");
    format!("{first} {last}")
}

pub fn run(rapport: &Rapport, args: &SeedArgs, policy: RetryPolicy) -> anyhow::Result<SeedReport> {
    if args.heroes > args.profiles {
        bail!(
            "cannot pick {} heroes from {} profiles",
            args.heroes,
            args.profiles
        );
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut report = SeedReport::default();

    let mut ids = Vec::with_capacity(args.profiles);
    for _ in 0..args.profiles {
        let id = ProfileId::new();
        rapport.create_profile(id, &random_name(&mut rng))?;
        ids.push(id);
    }
    report.profiles = ids.len();
    report.heroes = ids[..args.heroes].to_vec();
    tracing::info!(profiles = ids.len(), heroes = args.heroes, "profiles generated");

    let heroes = report.heroes.clone();
    let plan = [
        (Direction::HeroInvited, args.invited_f),
        (Direction::HeroInviting, args.inviting_f),
    ];
    for (direction, count) in plan {
        for &hero in &heroes {
            for _ in 0..count {
                report.retries += invite_one(rapport, &ids, hero, direction, policy, &mut rng)?;
                report.invitations += 1;
            }
        }
    }
    Ok(report)
}

/// Create one invitation for `hero`, returning how many retries it took.
fn invite_one(
    rapport: &Rapport,
    ids: &[ProfileId],
    hero: ProfileId,
    direction: Direction,
    policy: RetryPolicy,
    rng: &mut StdRng,
) -> anyhow::Result<usize> {
    for attempt in 0..policy.max_attempts {
        let Some(&other) = ids.choose(rng) else {
            bail!("no profiles to sample for hero {}", hero);
        };
        let (inviting, invited) = match direction {
            Direction::HeroInvited => (other, hero),
            Direction::HeroInviting => (hero, other),
        };
        match rapport.create_invitation(inviting, invited) {
            Ok(_) => return Ok(attempt as usize),
            Err(err @ (Error::SelfReference { .. } | Error::Duplicate { .. } | Error::Transient { .. })) => {
                tracing::debug!(%hero, attempt, error = %err, "invitation sample rejected");
                if policy.backoff_ms > 0 {
                    std::thread::sleep(Duration::from_millis(policy.backoff_ms));
                }
            }
            Err(err) => return Err(err.into()),
        }
    }
    bail!(
        "unable to create invitation for hero {} after {} attempts; is it impossible or just unlucky?",
        hero,
        policy.max_attempts
    )
}
