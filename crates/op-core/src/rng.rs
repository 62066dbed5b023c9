//! Deterministic per-agent and run-level RNG wrappers.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (agent_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! This means:
//!
//! - Agents never share RNG state (no contention, no ordering dependency).
//! - Removing an agent does not disturb the seeds of surviving agents —
//!   invariant I4 (agent ids are never reused) composes cleanly with this.
//! - Re-running invocation `i` with the same `randomSeed` always reproduces
//!   the same per-agent sequences (S6, §8).
//!
//! [`StochasticsRng`] is the kernel's built-in implementation of the
//! `Stochastics` plug-in category's contract (§6): `InitGenerator(seed)` is
//! `StochasticsRng::new`, `GetUniformDistributed(a, b)` is
//! [`StochasticsRng::uniform`].

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG.
///
/// Create one per agent at spawn time. The type is `!Sync` to prevent
/// accidental sharing across threads — each worker must hold its own slice
/// when collision-prediction or similar per-task parallelism (§5) is used.
#[derive(Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        let seed = global_seed ^ agent.0.wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Choose a random element from a non-empty slice, uniformly.
    ///
    /// Used by navigation (§4.2) to pick among viable junction exits.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}

// ── StochasticsRng ────────────────────────────────────────────────────────────

/// Run-level RNG for global stochastics: world-parameter sampling
/// (time-of-day, visibility, friction, weather — §4.8) and any other
/// operation not tied to a specific agent.
///
/// This is the kernel's default implementation of the `Stochastics`
/// plug-in category; `dt-plugin` consumers that bind an external
/// stochastics library use that library's generator instead.
pub struct StochasticsRng(SmallRng);

impl StochasticsRng {
    /// `InitGenerator(seed)` — (re)seed the generator.
    pub fn new(seed: u64) -> Self {
        StochasticsRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child generator with a different seed offset — useful for
    /// seeding per-thread generators deterministically from the root seed.
    pub fn child(&mut self, offset: u64) -> StochasticsRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        StochasticsRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// `GetUniformDistributed(a, b)`.
    #[inline]
    pub fn uniform(&mut self, a: f64, b: f64) -> f64 {
        if a >= b {
            return a;
        }
        self.0.gen_range(a..b)
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
