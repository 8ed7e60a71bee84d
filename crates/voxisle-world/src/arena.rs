//! Contiguous voxel storage for every chunk of the world.

use rayon::prelude::*;
use voxisle_core::constants::CHUNK_VOLUME;
use voxisle_core::{BlockId, ChunkPos, LocalPos, WorldPos};

use crate::config::WorldDims;

/// Where a world voxel lives inside the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoxelLocation {
    /// Flat chunk index.
    pub chunk_index: usize,
    /// Owning chunk.
    pub chunk: ChunkPos,
    /// Position inside the chunk.
    pub local: LocalPos,
    /// Flat voxel index inside the chunk.
    pub voxel_index: usize,
}

/// One slab of voxel bytes holding all chunks back to back.
///
/// Chunk `i` owns `voxels[i * CHUNK_VOLUME..(i + 1) * CHUNK_VOLUME]`, so any
/// voxel in the world, including those of neighboring chunks, is one index
/// computation away.
#[derive(Clone, Debug)]
pub struct VoxelArena {
    dims: WorldDims,
    voxels: Vec<u8>,
}

impl VoxelArena {
    /// Create an all-air arena.
    pub fn new(dims: WorldDims) -> Self {
        Self {
            dims,
            voxels: vec![0; dims.chunk_count() * CHUNK_VOLUME],
        }
    }

    /// World size in chunks.
    pub fn dims(&self) -> WorldDims {
        self.dims
    }

    /// Voxels of one chunk.
    #[inline]
    pub fn chunk(&self, chunk_index: usize) -> &[u8] {
        let start = chunk_index * CHUNK_VOLUME;
        &self.voxels[start..start + CHUNK_VOLUME]
    }

    /// Mutable voxels of one chunk.
    #[inline]
    pub fn chunk_mut(&mut self, chunk_index: usize) -> &mut [u8] {
        let start = chunk_index * CHUNK_VOLUME;
        &mut self.voxels[start..start + CHUNK_VOLUME]
    }

    /// All chunk slices, in chunk index order, for parallel generation.
    pub fn par_chunks_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, u8> {
        self.voxels.par_chunks_exact_mut(CHUNK_VOLUME)
    }

    /// Raw bytes of the whole world.
    pub fn as_bytes(&self) -> &[u8] {
        &self.voxels
    }

    /// Resolve a world voxel to its chunk and in-chunk index.
    ///
    /// Returns `None` outside the world.
    #[inline]
    pub fn locate(&self, pos: WorldPos) -> Option<VoxelLocation> {
        let (chunk, local) = pos.split();
        let chunk_index = self.dims.chunk_index(chunk)?;
        Some(VoxelLocation {
            chunk_index,
            chunk,
            local,
            voxel_index: local.to_index(),
        })
    }

    /// Block at a world position, or `None` outside the world.
    #[inline]
    pub fn get(&self, pos: WorldPos) -> Option<BlockId> {
        let loc = self.locate(pos)?;
        Some(BlockId(self.voxels[loc.chunk_index * CHUNK_VOLUME + loc.voxel_index]))
    }

    /// Whether a world position holds a solid voxel. Outside the world is never solid.
    #[inline]
    pub fn is_solid(&self, pos: WorldPos) -> bool {
        self.get(pos).is_some_and(BlockId::is_solid)
    }

    /// Overwrite a voxel, returning the previous block, or `None` outside the world.
    pub fn set(&mut self, pos: WorldPos, block: BlockId) -> Option<BlockId> {
        let loc = self.locate(pos)?;
        let slot = &mut self.voxels[loc.chunk_index * CHUNK_VOLUME + loc.voxel_index];
        let previous = BlockId(*slot);
        *slot = block.0;
        Some(previous)
    }
}
