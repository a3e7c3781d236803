//! Deterministic Random Number Generator
//!
//! Uses the Mulberry32 algorithm so that the daily shuffle matches the
//! browser client bit for bit. Given the same seed, produces an identical
//! sequence on all platforms.

/// Mulberry32 increment (Weyl sequence step).
const MULBERRY_STEP: u32 = 0x6D2B_79F5;

/// 2^32 as a float, for mapping raw output into [0, 1).
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic PRNG using the Mulberry32 algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG produces the exact same sequence of
/// values on any platform. It is gameplay randomness, not a CSPRNG.
///
/// # Example
///
/// ```
/// use daily_recall::core::rng::DeterministicRng;
///
/// let mut rng = DeterministicRng::new(12345);
/// let value = rng.next_u32();
/// assert_eq!(value, 4207900869); // Always the same!
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterministicRng {
    state: u32,
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Generate the next 32-bit random value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_STEP);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Generate a float in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }

    /// Generate a random integer in range [0, max).
    ///
    /// Computed as `floor(next_f64() * max)` in integer arithmetic, which
    /// is exact for every `max` a deck can reach.
    #[inline]
    pub fn next_below(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Generate a random boolean that is true `percent`% of the time.
    #[inline]
    pub fn next_percent(&mut self, percent: u32) -> bool {
        self.next_below(100) < percent
    }

    /// Shuffle a slice in place using Fisher-Yates algorithm.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_below((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
