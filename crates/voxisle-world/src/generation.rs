//! Procedural terrain generation.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use voxisle_core::constants::{CHUNK_HALF_SIZE, CHUNK_SIZE, CHUNK_VOLUME};
use voxisle_core::coords::index;
use voxisle_core::{BlockId, ChunkPos, Error, Result, WorldPos};

use crate::config::WorldDims;
use crate::noise_field::NoiseField;
use crate::WorldSeed;

/// Terrain generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Base frequency of the height map; the first octave runs at 1.5x this.
    pub height_frequency: f64,
    /// Frequency of the noise that breaks the island's radial symmetry.
    pub symmetry_frequency: f64,
    /// Divisor applied to the base amplitude where that noise is negative.
    pub symmetry_damping: f64,
    /// Distance scale of the island mask.
    pub island_falloff: f64,
    /// Power of the island mask falloff.
    pub island_exponent: i32,
    /// Keeps the island mask finite at the world center.
    pub island_epsilon: f64,
    /// Frequency of the 3D cave noise.
    pub cave_frequency: f64,
    /// Frequency of the 2D noise bounding the bottom of caves.
    pub cave_floor_frequency: f64,
    /// Caves stay at least this many voxels below the surface.
    pub cave_roof_depth: i32,
    /// Minimum depth below the surface where solid stone starts.
    pub min_stone_depth: i32,
    /// Maximum depth below the surface where solid stone starts.
    pub max_stone_depth: i32,
    /// Strata boundaries are jittered by up to this many voxels.
    pub strata_jitter: i32,
    /// Lowest jittered height that turns to snow.
    pub snow_level: i32,
    /// Lowest jittered height that turns to stone.
    pub stone_level: i32,
    /// Lowest jittered height that turns to dirt.
    pub dirt_level: i32,
    /// Lowest jittered height that turns to grass; below is sand.
    pub grass_level: i32,
    /// Chance of a tree on a grass surface voxel.
    pub tree_probability: f64,
    /// Canopy width in voxels.
    pub tree_width: i32,
    /// Tree height in voxels, including the leaf cap.
    pub tree_height: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height_frequency: 0.005,
            symmetry_frequency: 0.1,
            symmetry_damping: 1.03,
            island_falloff: 0.0025,
            island_exponent: 20,
            island_epsilon: 0.0001,
            cave_frequency: 0.09,
            cave_floor_frequency: 0.1,
            cave_roof_depth: 10,
            min_stone_depth: 3,
            max_stone_depth: 6,
            strata_jitter: 7,
            snow_level: 50,
            stone_level: 40,
            dirt_level: 35,
            grass_level: 8,
            tree_probability: 0.004,
            tree_width: 4,
            tree_height: 8,
        }
    }
}

impl TerrainConfig {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.tree_probability) {
            return Err(Error::InvalidConfig(format!(
                "tree probability must be within [0, 1], got {}",
                self.tree_probability
            )));
        }
        if self.min_stone_depth > self.max_stone_depth || self.strata_jitter < 1 {
            return Err(Error::InvalidConfig(format!(
                "stone depth range {}..={} and strata jitter {} are inconsistent",
                self.min_stone_depth, self.max_stone_depth, self.strata_jitter
            )));
        }
        if self.tree_width < 2 || self.tree_height < 3 {
            return Err(Error::InvalidConfig(format!(
                "trees must be at least 2 wide and 3 tall, got {}x{}",
                self.tree_width, self.tree_height
            )));
        }
        if self.tree_width >= CHUNK_SIZE as i32 || self.tree_height >= CHUNK_SIZE as i32 {
            return Err(Error::InvalidConfig(format!(
                "trees of {}x{} do not fit in a chunk",
                self.tree_width, self.tree_height
            )));
        }
        Ok(())
    }
}

/// Procedural island terrain generator.
///
/// Every output is a pure function of the world seed and the voxel coordinate.
/// Random choices draw from a generator seeded by hashing both, so chunks can
/// be generated in any order or in parallel.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    config: TerrainConfig,
    noise: NoiseField,
    center_x: f64,
    center_z: f64,
    base_amplitude: f64,
}

impl TerrainGenerator {
    /// Create a new terrain generator for a world of the given size.
    ///
    /// Fails if `config` does not pass [`TerrainConfig::validate`].
    pub fn new(seed: WorldSeed, dims: WorldDims, config: TerrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(seed, dims, config))
    }

    /// Create a terrain generator with default configuration.
    pub fn with_seed(seed: WorldSeed, dims: WorldDims) -> Self {
        Self::build(seed, dims, TerrainConfig::default())
    }

    fn build(seed: WorldSeed, dims: WorldDims, config: TerrainConfig) -> Self {
        let half = CHUNK_HALF_SIZE as f64;
        Self {
            config,
            noise: NoiseField::new(seed),
            center_x: f64::from(dims.width) * half,
            center_z: f64::from(dims.depth) * half,
            base_amplitude: f64::from(dims.height) * half,
        }
    }

    /// Get the terrain configuration.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Noise field shared with other generators of this world.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Get terrain height at world XZ coordinates.
    ///
    /// Returns the number of solid voxels in the column; the surface voxel
    /// sits at `height - 1`.
    pub fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let c = &self.config;
        let (x, z) = (f64::from(world_x), f64::from(world_z));

        let distance = (x - self.center_x).hypot(z - self.center_z);
        let island = (1.0
            / ((c.island_falloff * distance).powi(c.island_exponent) + c.island_epsilon))
            .min(1.0);

        let mut a1 = self.base_amplitude;
        let (a2, a4, a8) = (a1 * 0.5, a1 * 0.25, a1 * 0.125);

        let f1 = c.height_frequency * 1.5;
        let (f2, f4, f8) = (f1 * 2.0, f1 * 4.0, f1 * 8.0);

        if self
            .noise
            .noise2(c.symmetry_frequency * x, c.symmetry_frequency * z)
            < 0.0
        {
            a1 /= c.symmetry_damping;
        }

        let n = |f: f64| self.noise.noise2(x * f, z * f);
        let mut height = n(f1) * a1 + a1;
        height += n(f2) * a2 - a2;
        height += n(f4) * a4 + a4;
        height += n(f8) * a8 - a8;
        height = height.max(n(f8) + 2.0);

        (height * island) as i32
    }

    /// Material of a voxel in a column of the given height, without trees.
    pub fn material_at(&self, pos: WorldPos, column_height: i32) -> BlockId {
        let mut rng = self.voxel_rng(pos);
        self.sample_voxel(pos, column_height, &mut rng)
    }

    /// Material of any world voxel, without trees.
    pub fn block_at(&self, pos: WorldPos) -> BlockId {
        self.material_at(pos, self.height_at(pos.x, pos.z))
    }

    /// Fill a chunk's voxels, including trees.
    ///
    /// Returns `true` if any voxel is solid.
    #[cfg_attr(
        feature = "profiling",
        tracing::instrument(level = "trace", skip_all, fields(chunk = ?pos))
    )]
    pub fn generate_chunk(&self, pos: ChunkPos, voxels: &mut [u8]) -> bool {
        assert_eq!(voxels.len(), CHUNK_VOLUME, "chunk slice has wrong length");
        voxels.fill(0);

        let origin = pos.to_world_pos();
        for x in 0..CHUNK_SIZE {
            let world_x = origin.x + x as i32;
            for z in 0..CHUNK_SIZE {
                let world_z = origin.z + z as i32;
                let column_height = self.height_at(world_x, world_z);
                let local_height = (column_height - origin.y).clamp(0, CHUNK_SIZE as i32);

                for y in 0..local_height as usize {
                    let world = WorldPos::new(world_x, origin.y + y as i32, world_z);
                    let mut rng = self.voxel_rng(world);
                    let block = self.sample_voxel(world, column_height, &mut rng);
                    voxels[index(x, y, z)] = block.0;

                    if block == BlockId::GRASS
                        && world.y == column_height - 1
                        && world.y < self.config.dirt_level
                    {
                        self.place_tree(voxels, x, y, z, &mut rng);
                    }
                }
            }
        }

        voxels.iter().any(|&v| v != 0)
    }

    fn sample_voxel(&self, pos: WorldPos, column_height: i32, rng: &mut SmallRng) -> BlockId {
        let c = &self.config;
        if pos.y >= column_height {
            return BlockId::AIR;
        }

        let stone_depth = rng.gen_range(c.min_stone_depth..=c.max_stone_depth);
        if pos.y < column_height - stone_depth {
            let (x, y, z) = (f64::from(pos.x), f64::from(pos.y), f64::from(pos.z));
            let cave = self.noise.noise3(
                x * c.cave_frequency,
                y * c.cave_frequency,
                z * c.cave_frequency,
            ) > 0.0;
            let cave_floor = self
                .noise
                .noise2(x * c.cave_floor_frequency, z * c.cave_floor_frequency)
                * 3.0
                + 3.0;
            let cave_roof = f64::from(column_height - c.cave_roof_depth);
            return if cave && cave_floor < y && y < cave_roof {
                BlockId::AIR
            } else {
                BlockId::STONE
            };
        }

        let jittered = pos.y - rng.gen_range(0..c.strata_jitter);
        if jittered >= c.snow_level {
            BlockId::SNOW
        } else if jittered >= c.stone_level {
            BlockId::STONE
        } else if jittered >= c.dirt_level {
            BlockId::DIRT
        } else if jittered >= c.grass_level {
            BlockId::GRASS
        } else {
            BlockId::SAND
        }
    }

    /// Maybe grow a tree rooted at local `(x, y, z)`.
    ///
    /// Trees never cross the chunk boundary: roots too close to an edge are
    /// skipped. Returns `true` if a tree was placed.
    fn place_tree(
        &self,
        voxels: &mut [u8],
        x: usize,
        y: usize,
        z: usize,
        rng: &mut SmallRng,
    ) -> bool {
        let c = &self.config;
        if rng.gen::<f64>() >= c.tree_probability {
            return false;
        }

        let half_width = c.tree_width / 2;
        let half_height = c.tree_height / 2;
        let size = CHUNK_SIZE as i32;
        let (x, y, z) = (x as i32, y as i32, z as i32);
        if y + c.tree_height >= size {
            return false;
        }
        if x - half_width < 0 || x + half_width >= size {
            return false;
        }
        if z - half_width < 0 || z + half_width >= size {
            return false;
        }

        let mut set = |x: i32, y: i32, z: i32, block: BlockId| {
            voxels[index(x as usize, y as usize, z as usize)] = block.0;
        };

        set(x, y, z, BlockId::DIRT);

        // Canopy layers shift diagonally every other layer and shrink after
        // the first; the (dx + dz) % 4 gaps keep them from looking solid.
        let mut shrink = 0;
        for (layer, iy) in (half_height..c.tree_height - 1).enumerate() {
            let shift = iy % 2;
            let lopsided = rng.gen_range(0..2);
            for ix in (-half_width + shrink)..(half_width - shrink * lopsided) {
                for iz in (-half_width + shrink * lopsided)..(half_width - shrink) {
                    if (ix + iz).rem_euclid(4) != 0 {
                        set(x + ix + shift, y + iy, z + iz + shift, BlockId::LEAVES);
                    }
                }
            }
            if layer > 0 {
                shrink = 1;
            }
        }

        for iy in 1..c.tree_height - 2 {
            set(x, y + iy, z, BlockId::WOOD);
        }
        set(x, y + c.tree_height - 2, z, BlockId::LEAVES);
        true
    }

    /// Random stream owned by a single voxel.
    fn voxel_rng(&self, pos: WorldPos) -> SmallRng {
        let hash = (pos.x as u64).wrapping_mul(73_856_093)
            ^ (pos.y as u64).wrapping_mul(19_349_663)
            ^ (pos.z as u64).wrapping_mul(83_492_791);
        SmallRng::seed_from_u64(self.noise.seed().wrapping_add(hash))
    }
}
