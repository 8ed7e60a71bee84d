//! Seeded scalar noise shared by terrain and cloud generation.

use noise::{NoiseFn, OpenSimplex};

use crate::WorldSeed;

/// Deterministic 2D/3D noise field, seeded once per world.
#[derive(Clone, Debug)]
pub struct NoiseField {
    seed: WorldSeed,
    simplex: OpenSimplex,
}

impl NoiseField {
    /// Create a noise field for the given world seed.
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            seed,
            simplex: OpenSimplex::new(fold_seed(seed)),
        }
    }

    /// The world seed this field was built from.
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Sample 2D noise, roughly in [-1, 1].
    #[inline]
    pub fn noise2(&self, x: f64, z: f64) -> f64 {
        self.simplex.get([x, z])
    }

    /// Sample 3D noise, roughly in [-1, 1].
    #[inline]
    pub fn noise3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z])
    }
}

/// Fold a 64-bit world seed into the 32-bit seed the noise backend takes.
fn fold_seed(seed: WorldSeed) -> u32 {
    (seed as u32) ^ ((seed >> 32) as u32)
}
