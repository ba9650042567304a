//! Friendship Consistency Test Suite
//!
//! Black-box tests against the public `Rapport` API. Every tier ends by
//! asserting the graph audit is clean.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Invitation invariants (self loops, duplicates, authorization)
//! - **Tier 2**: Accept transitions, including reverse-invitation cleanup
//! - **Tier 3**: Unfriend and profile cascade
//! - **Tier 4**: Concurrent races on shared pairs
//! - **Tier 5**: Random operation sequences (proptest)
//! - **Tier 6**: End-to-end flows
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test friendship_consistency
//! ```

// Test modules
mod test_utils;

// Tier 1: Invitation Invariants
mod tier1_invitation_invariants;

// Tier 2: Accept Transitions
mod tier2_accept;

// Tier 3: Unfriend and Cascade
mod tier3_unfriend;
mod tier3_cascade;

// Tier 4: Concurrency
mod tier4_concurrency;
