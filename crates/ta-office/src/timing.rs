//! Bounded delay generation.
//!
//! Actors never sample randomness directly: they ask a [`DelaySource`] for a
//! duration within a [`DelayRange`]. Production uses [`RandomDuration`];
//! tests substitute [`FixedDelay`] for deterministic service times.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Inclusive delay bounds in milliseconds.
///
/// Inverted bounds are accepted and swapped when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }

    /// Bounds in ascending order.
    #[must_use]
    pub fn ordered(&self) -> (u64, u64) {
        if self.min_ms > self.max_ms {
            (self.max_ms, self.min_ms)
        } else {
            (self.min_ms, self.max_ms)
        }
    }
}

/// Source of bounded delays shared by all actors.
pub trait DelaySource: Send + Sync {
    /// Returns a delay within `range` (inclusive).
    fn sample(&self, range: DelayRange) -> Duration;
}

/// Seeded random delay generator.
///
/// The RNG sits behind a mutex held only for a single draw.
pub struct RandomDuration {
    seed: u64,
    rng: Mutex<StdRng>,
}

impl RandomDuration {
    /// Create a generator with an explicit seed (reproducible runs).
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Create a generator seeded from the wall clock.
    #[must_use]
    pub fn from_wall_clock() -> Self {
        Self::from_seed(wall_clock_seed())
    }

    /// The seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns an integer in `[min, max]`; swaps the bounds if inverted.
    pub fn random_between(&self, min: u64, max: u64) -> u64 {
        let (low, high) = if min > max { (max, min) } else { (min, max) };
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(low..=high)
    }
}

impl DelaySource for RandomDuration {
    fn sample(&self, range: DelayRange) -> Duration {
        let (low, high) = range.ordered();
        Duration::from_millis(self.random_between(low, high))
    }
}

impl std::fmt::Debug for RandomDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomDuration")
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Delay source that ignores the range and always returns the same duration.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    #[must_use]
    pub const fn zero() -> Self {
        Self(Duration::ZERO)
    }
}

impl DelaySource for FixedDelay {
    fn sample(&self, _range: DelayRange) -> Duration {
        self.0
    }
}

fn wall_clock_seed() -> u64 {
    // Truncation is fine: only the low bits matter for a seed
    #[allow(clippy::cast_possible_truncation)]
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_random_between_stays_in_bounds() {
        let rng = RandomDuration::from_seed(7);

        for _ in 0..1000 {
            let value = rng.random_between(1, 3);
            assert!((1..=3).contains(&value), "value {value} out of [1, 3]");
        }
    }

    #[test]
    fn test_random_between_swaps_inverted_bounds() {
        let rng = RandomDuration::from_seed(7);

        for _ in 0..100 {
            let value = rng.random_between(10, 5);
            assert!((5..=10).contains(&value));
        }
    }

    #[test]
    fn test_random_between_degenerate_range() {
        let rng = RandomDuration::from_seed(1);
        assert_eq!(rng.random_between(4, 4), 4);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = RandomDuration::from_seed(99);
        let b = RandomDuration::from_seed(99);

        let seq_a: Vec<u64> = (0..20).map(|_| a.random_between(0, 1000)).collect();
        let seq_b: Vec<u64> = (0..20).map(|_| b.random_between(0, 1000)).collect();

        assert_eq!(seq_a, seq_b);
        assert_eq!(a.seed(), 99);
    }

    #[test]
    fn test_sample_returns_milliseconds() {
        let rng = RandomDuration::from_seed(3);

        let delay = rng.sample(DelayRange::new(1000, 3000));
        assert!(delay >= Duration::from_millis(1000));
        assert!(delay <= Duration::from_millis(3000));
    }

    #[test]
    fn test_fixed_delay_ignores_range() {
        let fixed = FixedDelay(Duration::from_millis(25));

        assert_eq!(
            fixed.sample(DelayRange::new(1000, 3000)),
            Duration::from_millis(25)
        );
        assert_eq!(FixedDelay::zero().sample(DelayRange::zero()), Duration::ZERO);
    }

    #[test]
    fn test_delay_range_ordered() {
        assert_eq!(DelayRange::new(3, 1).ordered(), (1, 3));
        assert_eq!(DelayRange::new(1, 3).ordered(), (1, 3));
    }

    #[test]
    fn test_debug_does_not_dump_rng_state() {
        let rng = RandomDuration::from_seed(5);
        let debug = format!("{rng:?}");
        assert!(debug.contains("seed: 5"));
    }
}
