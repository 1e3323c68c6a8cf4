//! Shared utilities

/// Simple deterministic RNG using xorshift64
/// Good for gameplay randomness (food placement) without external dependencies
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) } // Ensure non-zero
    }

    /// Get the next random u64
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Get a random index in [0, len)
    ///
    /// # Panics
    /// Panics in debug builds if `len == 0`
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index: len must be non-zero");
        if len <= 1 {
            return 0;
        }
        (self.next_u64() % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_index_within_len() {
        let mut rng = Rng::new(99);
        for _ in 0..100 {
            assert!(rng.index(5) < 5);
        }
        assert_eq!(rng.index(1), 0);
    }
}
