//! The session random source.
//!
//! Every probabilistic decision in the engine (combat rolls, room content
//! rolls, map splits) draws from one [`GameRng`] owned by the session and
//! passed down explicitly. Seeding happens exactly once, at construction,
//! which is what makes seeded and daily-challenge runs replayable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded uniform random source for the whole run.
#[derive(Debug)]
pub struct GameRng {
    inner: StdRng,
    seed: u64,
}

impl GameRng {
    /// Create a generator from an explicit seed (seeded runs, daily
    /// challenges, tests).
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a generator from OS entropy, remembering the seed so the run
    /// can be reported and replayed.
    pub fn from_entropy() -> Self {
        let seed = rand::thread_rng().gen();
        Self::seeded(seed)
    }

    /// The seed this run was started with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[lo, hi]` (inclusive). Degenerate ranges where
    /// `hi <= lo` return `lo`.
    pub fn roll_range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform integer in `[lo, hi]` for unsigned quantities (gold, horde
    /// sizes).
    pub fn roll_range_u32(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.inner.gen_range(lo..=hi)
    }

    /// Uniform float in `[0, 1)`.
    pub fn roll(&mut self) -> f64 {
        self.inner.gen()
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.gen::<f64>() < p
    }

    /// Uniform pick from a slice. `None` when the slice is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let i = self.inner.gen_range(0..items.len());
            Some(&items[i])
        }
    }

    /// Weighted pick: returns the index drawn in proportion to `weights`.
    /// `None` when the weights are empty or sum to zero.
    pub fn pick_weighted(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.inner.gen::<f64>() * total;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            if target < *w {
                return Some(i);
            }
            target -= w;
        }
        // Float accumulation can leave a sliver past the last bucket.
        weights.iter().rposition(|w| *w > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_runs_repeat() {
        let mut a = GameRng::seeded(42);
        let mut b = GameRng::seeded(42);
        for _ in 0..64 {
            assert_eq!(a.roll_range(0, 1000), b.roll_range(0, 1000));
        }
    }

    #[test]
    fn roll_range_is_inclusive_and_tolerates_degenerate_bounds() {
        let mut rng = GameRng::seeded(7);
        let mut seen_lo = false;
        let mut seen_hi = false;
        for _ in 0..200 {
            let v = rng.roll_range(3, 5);
            assert!((3..=5).contains(&v));
            seen_lo |= v == 3;
            seen_hi |= v == 5;
        }
        assert!(seen_lo && seen_hi);
        assert_eq!(rng.roll_range(9, 9), 9);
        assert_eq!(rng.roll_range(9, 2), 9);
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = GameRng::seeded(11);
        for _ in 0..100 {
            let i = rng.pick_weighted(&[0.0, 1.0, 0.0]).unwrap();
            assert_eq!(i, 1);
        }
        assert!(rng.pick_weighted(&[]).is_none());
        assert!(rng.pick_weighted(&[0.0, 0.0]).is_none());
    }
}
