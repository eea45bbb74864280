//! Deterministic generator for per-frame jitter.

/// SplitMix64 generator.
///
/// Seeded from the content hash so that recomposing the same upload draws
/// the same offsets.
#[derive(Clone, Copy, Debug)]
pub struct JitterRng {
    state: u64,
}

impl JitterRng {
    /// Creates a generator from a seed.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn below(&mut self, bound: u32) -> u32 {
        // Multiply-shift keeps the result strictly below `bound`.
        ((u128::from(self.next_u64()) * u128::from(bound)) >> 64) as u32
    }
}
