//! Deterministic pseudo-randomness for reproducible splits
//!
//! A fixed LCG instead of a library RNG keeps the permutation identical across
//! platforms, toolchains and dependency upgrades.

use std::num::Wrapping;

/// Seed used for every train/test split
pub const SPLIT_SEED: u64 = 42;

/// Linear Congruential Generator (glibc constants)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 1103515245;
    const INCREMENT: u64 = 12345;
    const MODULUS: u64 = 1 << 31;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Wrapping(seed % Self::MODULUS),
        }
    }

    /// Next value in [0, 2^31)
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state = Wrapping(self.state.0 & (Self::MODULUS - 1));
        self.state.0 as u32
    }

    /// Upper 16 bits of the next draw; the low bits of a power-of-two
    /// modulus LCG repeat with short periods.
    fn next_high16(&mut self) -> u64 {
        (self.next_u32() >> 15) as u64
    }

    /// Value in [0, max); 0 when `max` is 0.
    ///
    /// Built from the high bits of three draws (48 bits).
    pub fn next_below(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        let wide = (self.next_high16() << 32) | (self.next_high16() << 16) | self.next_high16();
        (wide % max as u64) as usize
    }
}

/// Fisher–Yates permutation of `0..n`.
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = LcgRng::new(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.next_below(i + 1);
        indices.swap(i, j);
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_determinism() {
        let mut rng1 = LcgRng::new(42);
        let mut rng2 = LcgRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_lcg_known_sequence() {
        let mut rng = LcgRng::new(42);
        assert_eq!(rng.next_u32(), 1250496027);
        assert_eq!(rng.next_u32(), 1116302264);
    }

    #[test]
    fn test_next_below_range() {
        let mut rng = LcgRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_below(10) < 10);
        }
        assert_eq!(rng.next_below(0), 0);
    }

    #[test]
    fn test_permutation_is_complete() {
        let mut perm = permutation(100, SPLIT_SEED);
        assert_ne!(perm, (0..100).collect::<Vec<_>>());
        perm.sort_unstable();
        assert_eq!(perm, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_permutation_depends_on_seed() {
        assert_eq!(permutation(50, 42), permutation(50, 42));
        assert_ne!(permutation(50, 42), permutation(50, 43));
    }

    #[test]
    fn test_permutation_trivial_sizes() {
        assert!(permutation(0, SPLIT_SEED).is_empty());
        assert_eq!(permutation(1, SPLIT_SEED), vec![0]);
    }
}
