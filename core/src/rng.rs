//! The linear congruential generator every consumer shares.
//!
//! RULE: Nothing in this crate draws a scheduling random number any
//! other way. The Monte-Carlo simulator, the runtime preview, and the
//! emitted calculation fields all walk this exact recurrence, in the
//! exact chain order, so all three agree bit-for-bit for a given seed.
//!
//! Constants are the classic Numerical Recipes values. Draws are
//! reduced with low-order modulo (`value % range`) because that is the
//! only reduction the host platform's expression engine can evaluate —
//! do not switch to high-bit extraction.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::types::{Day, Minutes};

/// LCG multiplier.
pub const LCG_A: u64 = 1_664_525;
/// LCG increment.
pub const LCG_C: u64 = 1_013_904_223;
/// LCG modulus (2^32).
pub const LCG_M: u64 = 4_294_967_296;

/// Warm-up steps applied to a raw user-entered seed before any draw.
/// The emitter renders this many nested step expressions; everything
/// else calls [`seed_transform`]. This constant is the only place the
/// number lives.
pub const SEED_WARMUP_STEPS: u32 = 3;

/// One LCG step: `(A * current + C) mod M`.
///
/// Pure and total. Inputs are reduced into `[0, M)` first, so the
/// multiply can never overflow `u64`.
#[inline]
pub fn step(current: u64) -> u64 {
    (LCG_A * (current % LCG_M) + LCG_C) % LCG_M
}

/// Decorrelate a raw seed by applying [`step`] [`SEED_WARMUP_STEPS`]
/// times. Shared by the simulator warm-up and the emitted `seed` field.
pub fn seed_transform(raw: u64) -> u64 {
    let mut state = raw % LCG_M;
    for _ in 0..SEED_WARMUP_STEPS {
        state = step(state);
    }
    state
}

/// Reduce a draw into `[0, range)`. Callers guarantee `range > 0`.
#[inline]
pub fn bounded(draw: u64, range: Minutes) -> Minutes {
    debug_assert!(range > 0, "bounded() requires a positive range");
    (draw % range as u64) as Minutes
}

/// A per-day jitter offset in `[-jitter, jitter)`, from one raw draw.
#[inline]
pub fn jitter_offset(draw: u64, jitter: Minutes) -> Minutes {
    debug_assert!(jitter > 0, "jitter_offset() requires a positive radius");
    (draw as Minutes % (2 * jitter)) - jitter
}

/// Walks the canonical draw chain for one seed.
///
/// Chain order is normative and matches the emitted field chain:
/// seed transform, then one draw per day (jitter enabled only), then
/// one draw per sample in expander order. A disabled jitter consumes
/// no chain positions.
#[derive(Debug, Clone)]
pub struct DrawChain {
    state: u64,
}

impl DrawChain {
    /// Begin a chain from a raw (untransformed) seed.
    pub fn start(raw_seed: u64) -> Self {
        Self { state: seed_transform(raw_seed) }
    }

    /// The most recently drawn value.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Advance one step and return the new draw.
    pub fn next_draw(&mut self) -> u64 {
        self.state = step(self.state);
        self.state
    }

    /// Draw the per-day jitter offsets, one per day in day order.
    /// With `jitter == 0` every offset is zero and no draw is consumed.
    pub fn day_offsets(&mut self, num_days: Day, jitter: Minutes) -> Vec<Minutes> {
        if jitter <= 0 {
            return vec![0; num_days as usize];
        }
        (0..num_days)
            .map(|_| jitter_offset(self.next_draw(), jitter))
            .collect()
    }
}

/// Stream of independent 32-bit trial seeds for the Monte-Carlo
/// diagnostic, derived from one master seed so an entire diagnostic
/// run is reproducible.
pub struct TrialSeeds {
    inner: Pcg64Mcg,
}

impl TrialSeeds {
    pub fn new(master_seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(master_seed) }
    }

    /// Next uniformly random seed in `[0, 2^32)`.
    pub fn next_seed(&mut self) -> u64 {
        self.inner.next_u32() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_matches_golden_chain() {
        // Reference values computed once from the recurrence with
        // A=1664525, C=1013904223, M=2^32, starting at 42.
        let golden = [
            1_083_814_273u64,
            378_494_188,
            2_479_403_867,
            955_863_294,
            1_613_448_261,
        ];
        let mut state = 42u64;
        for expected in golden {
            state = step(state);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn seed_transform_is_three_steps() {
        assert_eq!(seed_transform(42), 2_479_403_867);
        assert_eq!(seed_transform(42), step(step(step(42))));
    }

    #[test]
    fn step_is_pure() {
        assert_eq!(step(12345), step(12345));
    }

    #[test]
    fn step_stays_below_modulus() {
        let mut state = u64::MAX; // out-of-range input is reduced, not UB
        for _ in 0..100 {
            state = step(state);
            assert!(state < LCG_M);
        }
    }

    #[test]
    fn no_repeats_within_1000_steps() {
        let mut seen = std::collections::HashSet::new();
        let mut state = 42u64;
        for _ in 0..1000 {
            state = step(state);
            assert!(seen.insert(state), "cycle shorter than 1000 at {state}");
        }
    }

    #[test]
    fn jitter_offset_spans_radius() {
        for draw in 0..200u64 {
            let off = jitter_offset(draw, 15);
            assert!((-15..15).contains(&off), "offset {off} out of range");
        }
        assert_eq!(jitter_offset(0, 15), -15);
        assert_eq!(jitter_offset(29, 15), 14);
    }

    #[test]
    fn disabled_jitter_consumes_no_draws() {
        let mut with = DrawChain::start(42);
        let mut without = DrawChain::start(42);
        let _ = without.day_offsets(7, 0);
        assert_eq!(with.next_draw(), without.next_draw());
    }

    #[test]
    fn trial_seeds_are_reproducible() {
        let mut a = TrialSeeds::new(99);
        let mut b = TrialSeeds::new(99);
        for _ in 0..50 {
            assert_eq!(a.next_seed(), b.next_seed());
        }
    }
}
