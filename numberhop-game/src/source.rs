//! Injectable number sources for problem generation.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::VecDeque;

/// Supplies uniformly distributed integers to the problem generator.
pub trait NumberSource {
    /// Draw an integer from the inclusive range `low..=high`.
    ///
    /// Implementations return `low` when `high <= low`.
    fn next_in(&mut self, low: i32, high: i32) -> i32;

    /// Draw an index into a collection of `len` items.
    fn next_index(&mut self, len: usize) -> usize {
        let Some(max) = len.checked_sub(1) else {
            return 0;
        };
        let high = i32::try_from(max).unwrap_or(i32::MAX);
        usize::try_from(self.next_in(0, high)).unwrap_or(0)
    }
}

/// Adapter exposing any [`rand::Rng`] as a [`NumberSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    pub const fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ChaCha20Rng> {
    /// Deterministic source; the same seed yields the same problem sequence.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> NumberSource for RngSource<R> {
    fn next_in(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        self.0.gen_range(low..=high)
    }
}

/// Replays a fixed list of values, clamped into each requested range.
/// Once exhausted it keeps returning the low end of the range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: VecDeque<i32>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl NumberSource for ScriptedSource {
    fn next_in(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            self.values.pop_front();
            return low;
        }
        self.values
            .pop_front()
            .map_or(low, |value| value.clamp(low, high))
    }
}
