//! Coordinate systems for the voxel world.

use crate::constants::{CHUNK_AREA, CHUNK_SIZE};
use bytemuck::{Pod, Zeroable};
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// Position within a chunk (0 to CHUNK_SIZE-1 per axis).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct LocalPos {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub _pad: u8,
}

impl LocalPos {
    /// Create a new local position
    #[inline]
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        debug_assert!((x as usize) < CHUNK_SIZE);
        debug_assert!((y as usize) < CHUNK_SIZE);
        debug_assert!((z as usize) < CHUNK_SIZE);
        Self { x, y, z, _pad: 0 }
    }

    /// Convert to linear index for flat array storage.
    ///
    /// Voxels are laid out X-major, then Z, then Y: `x + S*z + S^2*y`.
    /// Terrain generation, meshing and editing all rely on this order.
    #[inline]
    pub const fn to_index(self) -> usize {
        index(self.x as usize, self.y as usize, self.z as usize)
    }

    /// Create from linear index
    #[inline]
    pub const fn from_index(index: usize) -> Self {
        let x = (index % CHUNK_SIZE) as u8;
        let z = ((index / CHUNK_SIZE) % CHUNK_SIZE) as u8;
        let y = (index / CHUNK_AREA) as u8;
        Self { x, y, z, _pad: 0 }
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x as i32, self.y as i32, self.z as i32)
    }

    /// Whether this position touches any of the six chunk faces.
    #[inline]
    pub const fn on_boundary(self) -> bool {
        let last = (CHUNK_SIZE - 1) as u8;
        self.x == 0
            || self.y == 0
            || self.z == 0
            || self.x == last
            || self.y == last
            || self.z == last
    }
}

/// Flat voxel index for in-chunk coordinates.
#[inline]
pub const fn index(x: usize, y: usize, z: usize) -> usize {
    x + CHUNK_SIZE * z + CHUNK_AREA * y
}

/// Chunk position in chunk coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(C)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub _pad: i32,
}

impl ChunkPos {
    /// Create a new chunk position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z, _pad: 0 }
    }

    /// Convert to world position (corner of chunk)
    #[inline]
    pub const fn to_world_pos(self) -> WorldPos {
        WorldPos::new(
            self.x * CHUNK_SIZE_I32,
            self.y * CHUNK_SIZE_I32,
            self.z * CHUNK_SIZE_I32,
        )
    }

    /// Offset by a chunk-space delta
    #[inline]
    pub const fn offset(self, delta: IVec3) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for ChunkPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// World position in voxel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl WorldPos {
    /// Create a new world position
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the chunk containing this position.
    ///
    /// Uses floor division so that negative coordinates land in negative chunks.
    #[inline]
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(
            self.x.div_euclid(CHUNK_SIZE_I32),
            self.y.div_euclid(CHUNK_SIZE_I32),
            self.z.div_euclid(CHUNK_SIZE_I32),
        )
    }

    /// Get the local position within the chunk
    #[inline]
    pub const fn local_pos(self) -> LocalPos {
        LocalPos::new(
            self.x.rem_euclid(CHUNK_SIZE_I32) as u8,
            self.y.rem_euclid(CHUNK_SIZE_I32) as u8,
            self.z.rem_euclid(CHUNK_SIZE_I32) as u8,
        )
    }

    /// Split into chunk and local position
    #[inline]
    pub const fn split(self) -> (ChunkPos, LocalPos) {
        (self.chunk_pos(), self.local_pos())
    }

    /// Create from chunk and local position
    #[inline]
    pub const fn from_chunk_local(chunk: ChunkPos, local: LocalPos) -> Self {
        Self::new(
            chunk.x * CHUNK_SIZE_I32 + local.x as i32,
            chunk.y * CHUNK_SIZE_I32 + local.y as i32,
            chunk.z * CHUNK_SIZE_I32 + local.z as i32,
        )
    }

    /// Offset by a voxel-space delta
    #[inline]
    pub const fn offset(self, delta: IVec3) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.z + delta.z)
    }

    /// Convert to glam IVec3
    #[inline]
    pub const fn to_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for WorldPos {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for WorldPos {
    fn from(v: Vec3) -> Self {
        Self::new(v.x.floor() as i32, v.y.floor() as i32, v.z.floor() as i32)
    }
}
