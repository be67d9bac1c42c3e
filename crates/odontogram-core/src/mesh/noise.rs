//! Seeded, deterministic pseudo-random values.
//!
//! Everything here is pure integer/float arithmetic on the seed so that a
//! given seed always produces bit-identical output.

/// SplitMix64 step.
pub fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Stream of uniform values derived from a seed.
#[derive(Debug, Clone)]
pub struct SeedStream {
    state: u64,
}

impl SeedStream {
    pub fn new(seed: u32) -> Self {
        Self {
            state: splitmix64(seed as u64),
        }
    }

    /// Next value in [0, 1).
    pub fn next_unit(&mut self) -> f32 {
        self.state = splitmix64(self.state);
        // top 24 bits fit exactly in an f32 mantissa
        (self.state >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Next value in [-1, 1).
    pub fn next_signed(&mut self) -> f32 {
        self.next_unit() * 2.0 - 1.0
    }
}

/// Low-frequency surface noise over the (x, z) footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceNoise {
    phase_x: f32,
    phase_z: f32,
    frequency_x: f32,
    frequency_z: f32,
}

impl SurfaceNoise {
    pub fn new(seed: u32) -> Self {
        let mut stream = SeedStream::new(seed ^ 0x5EED_70E7);
        Self {
            phase_x: stream.next_unit() * std::f32::consts::TAU,
            phase_z: stream.next_unit() * std::f32::consts::TAU,
            frequency_x: 2.5 + stream.next_unit() * 1.5,
            frequency_z: 2.5 + stream.next_unit() * 1.5,
        }
    }

    /// Value in [-1, 1] at a footprint point and height.
    pub fn sample(&self, x: f32, z: f32, height: f32) -> f32 {
        let a = (x * self.frequency_x + self.phase_x).sin();
        let b = (z * self.frequency_z + self.phase_z + height * 1.7).cos();
        a * b
    }
}
