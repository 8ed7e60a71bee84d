//! World configuration.

use serde::{Deserialize, Serialize};
use voxisle_core::constants::CHUNK_SIZE;
use voxisle_core::{ChunkPos, Error, Result};

use crate::generation::TerrainConfig;
use crate::WorldSeed;

/// Largest world size per axis, in chunks.
pub const MAX_CHUNKS_PER_AXIS: u32 = u16::MAX as u32 / CHUNK_SIZE as u32;

/// Largest world height in chunks. Clouds sit at twice the world's voxel height.
pub const MAX_HEIGHT_CHUNKS: u32 = u16::MAX as u32 / (2 * CHUNK_SIZE as u32);

/// Size of the world in chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldDims {
    /// Chunks along X.
    pub width: u32,
    /// Chunks along Y.
    pub height: u32,
    /// Chunks along Z.
    pub depth: u32,
}

impl WorldDims {
    /// Create new world dimensions.
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of chunk slots.
    pub const fn chunk_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Flat chunk index `cx + W*cz + W*D*cy`, or `None` outside the world.
    #[inline]
    pub fn chunk_index(&self, pos: ChunkPos) -> Option<usize> {
        let (cx, cy, cz) = (
            u32::try_from(pos.x).ok()?,
            u32::try_from(pos.y).ok()?,
            u32::try_from(pos.z).ok()?,
        );
        if cx >= self.width || cy >= self.height || cz >= self.depth {
            return None;
        }
        let (w, d) = (self.width as usize, self.depth as usize);
        Some(cx as usize + w * cz as usize + w * d * cy as usize)
    }

    /// Inverse of [`chunk_index`](Self::chunk_index).
    pub fn chunk_pos(&self, index: usize) -> ChunkPos {
        let (w, d) = (self.width as usize, self.depth as usize);
        let x = index % w;
        let z = (index / w) % d;
        let y = index / (w * d);
        ChunkPos::new(x as i32, y as i32, z as i32)
    }

    /// World extent in voxels along X, Y and Z.
    pub const fn voxel_extent(&self) -> (u32, u32, u32) {
        let s = CHUNK_SIZE as u32;
        (self.width * s, self.height * s, self.depth * s)
    }
}

impl Default for WorldDims {
    fn default() -> Self {
        Self::new(30, 2, 30)
    }
}

/// Everything needed to build a world.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Seed for all procedural generation.
    pub seed: WorldSeed,
    /// World size in chunks.
    pub dims: WorldDims,
    /// Terrain shaping parameters.
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dims: WorldDims::default(),
            terrain: TerrainConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Default configuration with a seed picked at random for this process.
    pub fn with_random_seed() -> Self {
        Self::default().with_seed(rand::random())
    }

    /// Set the world seed.
    #[must_use]
    pub fn with_seed(mut self, seed: WorldSeed) -> Self {
        self.seed = seed;
        self
    }

    /// Set the world size in chunks.
    #[must_use]
    pub fn with_dims(mut self, width: u32, height: u32, depth: u32) -> Self {
        self.dims = WorldDims::new(width, height, depth);
        self
    }

    /// Replace the terrain parameters.
    #[must_use]
    pub fn with_terrain(mut self, terrain: TerrainConfig) -> Self {
        self.terrain = terrain;
        self
    }

    /// Reject configurations the engine cannot represent.
    pub fn validate(&self) -> Result<()> {
        let dims = self.dims;
        if dims.width == 0 || dims.height == 0 || dims.depth == 0 {
            return Err(Error::InvalidConfig(format!(
                "world must be at least one chunk on every axis, got {}x{}x{}",
                dims.width, dims.height, dims.depth
            )));
        }
        // Cloud vertices store world voxel coordinates as u16.
        if dims.width > MAX_CHUNKS_PER_AXIS
            || dims.height > MAX_CHUNKS_PER_AXIS
            || dims.depth > MAX_CHUNKS_PER_AXIS
        {
            return Err(Error::InvalidConfig(format!(
                "world may span at most {MAX_CHUNKS_PER_AXIS} chunks per axis, got {}x{}x{}",
                dims.width, dims.height, dims.depth
            )));
        }
        if dims.height > MAX_HEIGHT_CHUNKS {
            return Err(Error::InvalidConfig(format!(
                "world may be at most {MAX_HEIGHT_CHUNKS} chunks tall for the cloud layer, got {}",
                dims.height
            )));
        }
        self.terrain.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clouds::cloud_altitude;

    #[test]
    fn chunk_index_roundtrip() {
        let dims = WorldDims::new(3, 2, 4);
        for i in 0..dims.chunk_count() {
            let pos = dims.chunk_pos(i);
            assert_eq!(dims.chunk_index(pos), Some(i));
        }
    }

    #[test]
    fn chunk_index_layout() {
        let dims = WorldDims::new(3, 2, 4);
        assert_eq!(dims.chunk_index(ChunkPos::new(1, 0, 0)), Some(1));
        assert_eq!(dims.chunk_index(ChunkPos::new(0, 0, 1)), Some(3));
        assert_eq!(dims.chunk_index(ChunkPos::new(0, 1, 0)), Some(12));
    }

    #[test]
    fn out_of_world_chunks_have_no_index() {
        let dims = WorldDims::new(3, 2, 4);
        assert_eq!(dims.chunk_index(ChunkPos::new(-1, 0, 0)), None);
        assert_eq!(dims.chunk_index(ChunkPos::new(3, 0, 0)), None);
        assert_eq!(dims.chunk_index(ChunkPos::new(0, 2, 0)), None);
        assert_eq!(dims.chunk_index(ChunkPos::new(0, 0, 4)), None);
    }

    #[test]
    fn zero_sized_world_is_rejected() {
        let config = WorldConfig::default().with_dims(0, 1, 1);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn height_is_capped_by_cloud_altitude() {
        let config = WorldConfig::default().with_dims(1, 700, 1);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let dims = WorldDims::new(1, MAX_HEIGHT_CHUNKS, 1);
        assert!(WorldConfig::default().with_dims(1, MAX_HEIGHT_CHUNKS, 1).validate().is_ok());
        let expected = 2 * MAX_HEIGHT_CHUNKS as usize * CHUNK_SIZE;
        assert_eq!(usize::from(cloud_altitude(dims)), expected);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
        assert!(WorldConfig::with_random_seed().validate().is_ok());
    }
}
