use std::time::{SystemTime, UNIX_EPOCH};

/// Xorshift generator, good enough to pick fallback cells
#[derive(Copy, Clone, Debug, Default)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn init(seed: u64) -> Self {
        // A zero state would stay zero forever
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    /// Seeds from the wall clock
    pub fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::init(nanos)
    }

    pub fn rand(&mut self) -> u64 {
        self.next_u64()
    }

    /// Uniform-ish value in `0..bound`, `bound` must be positive
    pub fn below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0, "Prng::below needs a positive bound");
        (self.next_u64() % bound as u64) as usize
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545F4914F6CDD1D)
    }
}
