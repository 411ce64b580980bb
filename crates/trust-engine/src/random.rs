//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG so that runs involving the Random strategy can be
//! replayed exactly. Uses xorshift64*.

/// Seeded random number generator
///
/// Deterministic: same seed + stream = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and a stream index
    pub fn new(seed: &[u8; 32], stream: u32) -> Self {
        let mut state = 0u64;
        for (i, chunk) in seed.chunks(8).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            state ^= u64::from_le_bytes(bytes).wrapping_add(i as u64);
        }

        state ^= (stream as u64).wrapping_mul(0x517cc1b727220a95);

        // xorshift never leaves the all-zero state
        if state == 0 {
            state = 0x9e3779b97f4a7c15;
        }

        let mut rng = Self { state };
        for _ in 0..8 {
            rng.next_u64();
        }

        rng
    }

    /// Create an RNG from a single integer seed (CLI and test convenience)
    pub fn from_u64(seed: u64) -> Self {
        let mut bytes = [0u8; 32];
        for (i, chunk) in bytes.chunks_mut(8).enumerate() {
            let word = seed.rotate_left(i as u32 * 16) ^ (i as u64);
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        Self::new(&bytes, 0)
    }

    /// Derive an independent sub-stream without advancing this generator
    pub fn fork(&self, stream: u32) -> Self {
        let mut new_state = self.state;
        new_state ^= (stream as u64).wrapping_add(1).wrapping_mul(0x9e3779b97f4a7c15);
        if new_state == 0 {
            new_state = 0x2545f4914f6cdd1d;
        }

        let mut rng = Self { state: new_state };
        rng.next_u64();
        rng
    }

    /// Generate next u64
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }

    /// Generate next u32
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Fair coin: true with probability 1/2
    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }
}
