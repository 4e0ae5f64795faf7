use rand_mt::Mt19937GenRand32;

/// Spawn RNG: 32-bit Mersenne Twister with unbiased bounded draws.
///
/// The draw pattern is part of the determinism contract: one bounded draw
/// for the cell index, then one for the tile value.
#[derive(Clone)]
pub(crate) struct SpawnRng {
    mt: Mt19937GenRand32,
}

impl SpawnRng {
    pub(crate) fn from_seed(seed: u32) -> Self {
        SpawnRng { mt: Mt19937GenRand32::new(seed) }
    }

    pub(crate) fn reseed(&mut self, seed: u32) {
        self.mt.reseed(seed);
    }

    /// Uniform integer in `0..upper` by rejection sampling over the full
    /// 32-bit output range. `upper == 0` yields 0 without consuming a draw.
    pub(crate) fn next_bounded(&mut self, upper: u32) -> u32 {
        if upper == 0 {
            return 0;
        }
        const RANGE: u64 = 1 << 32;
        let bucket = RANGE / upper as u64;
        let limit = bucket * upper as u64;
        loop {
            let value = self.mt.next_u32() as u64;
            if value < limit {
                return (value / bucket) as u32;
            }
        }
    }
}

/// Draw a fresh seed from the OS-seeded thread RNG.
pub fn entropy_seed() -> u32 {
    rand::random::<u32>()
}
