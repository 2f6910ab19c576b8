//! Randomized cycle durations
//!
//! Each actor owns its own seeded generator so its timing is reproducible and
//! independent of every other actor in the process.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default lower bound of a cycle.
pub const DEFAULT_MIN_CYCLE: Duration = Duration::from_secs(4);

/// Default upper bound of a cycle.
pub const DEFAULT_MAX_CYCLE: Duration = Duration::from_secs(6);

/// Closed interval `[min, max]` that cycle durations are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBounds {
    /// Shortest possible cycle
    pub min: Duration,
    /// Longest possible cycle
    pub max: Duration,
}

impl CycleBounds {
    /// Creates bounds, swapping the arguments if they are given out of order.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Returns whether `cycle` lies within the bounds (inclusive).
    #[must_use]
    pub fn contains(&self, cycle: Duration) -> bool {
        self.min <= cycle && cycle <= self.max
    }
}

impl Default for CycleBounds {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_CYCLE,
            max: DEFAULT_MAX_CYCLE,
        }
    }
}

/// Draws cycle durations uniformly from [`CycleBounds`].
#[derive(Debug)]
pub struct CycleTimer {
    rng: StdRng,
    bounds: CycleBounds,
    seed: u64,
}

impl CycleTimer {
    /// Creates a timer whose sequence is fully determined by `seed`.
    #[must_use]
    pub fn new(bounds: CycleBounds, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            bounds,
            seed,
        }
    }

    /// Returns the seed this timer was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configured bounds.
    #[must_use]
    pub const fn bounds(&self) -> CycleBounds {
        self.bounds
    }

    /// Draws the next cycle duration.
    pub fn next_cycle(&mut self) -> Duration {
        let CycleBounds { min, max } = self.bounds;
        if min == max {
            return min;
        }
        let secs = self.rng.random_range(min.as_secs_f64()..=max.as_secs_f64());
        // f64 rounding can land a few nanoseconds outside the interval.
        Duration::from_secs_f64(secs).clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_bounds() {
        let bounds = CycleBounds::default();
        assert_eq!(bounds.min, Duration::from_secs(4));
        assert_eq!(bounds.max, Duration::from_secs(6));
    }

    #[test]
    fn test_bounds_swap_when_reversed() {
        let bounds = CycleBounds::new(Duration::from_secs(6), Duration::from_secs(4));
        assert_eq!(bounds, CycleBounds::default());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = CycleTimer::new(CycleBounds::default(), 7);
        let mut b = CycleTimer::new(CycleBounds::default(), 7);
        for _ in 0..20 {
            assert_eq!(a.next_cycle(), b.next_cycle());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = CycleTimer::new(CycleBounds::default(), 1);
        let mut b = CycleTimer::new(CycleBounds::default(), 2);
        let a_cycles: Vec<_> = (0..8).map(|_| a.next_cycle()).collect();
        let b_cycles: Vec<_> = (0..8).map(|_| b.next_cycle()).collect();
        assert_ne!(a_cycles, b_cycles);
    }

    #[test]
    fn test_degenerate_bounds_are_fixed() {
        let fixed = Duration::from_millis(250);
        let mut timer = CycleTimer::new(CycleBounds::new(fixed, fixed), 0);
        assert_eq!(timer.next_cycle(), fixed);
        assert_eq!(timer.next_cycle(), fixed);
    }

    #[test]
    fn test_draws_spread_across_interval() {
        let mut timer = CycleTimer::new(CycleBounds::default(), 99);
        let cycles: Vec<_> = (0..200).map(|_| timer.next_cycle()).collect();
        assert!(cycles.iter().any(|c| *c < Duration::from_secs(5)));
        assert!(cycles.iter().any(|c| *c > Duration::from_secs(5)));
    }

    proptest! {
        #[test]
        fn prop_default_cycles_within_four_to_six_seconds(seed in any::<u64>()) {
            let mut timer = CycleTimer::new(CycleBounds::default(), seed);
            for _ in 0..16 {
                let cycle = timer.next_cycle();
                prop_assert!(cycle >= Duration::from_secs_f64(4.0));
                prop_assert!(cycle <= Duration::from_secs_f64(6.0));
            }
        }

        #[test]
        fn prop_cycles_within_arbitrary_bounds(
            seed in any::<u64>(),
            a in 0u64..10_000,
            b in 0u64..10_000,
        ) {
            let bounds = CycleBounds::new(Duration::from_millis(a), Duration::from_millis(b));
            let mut timer = CycleTimer::new(bounds, seed);
            for _ in 0..8 {
                prop_assert!(bounds.contains(timer.next_cycle()));
            }
        }
    }
}
