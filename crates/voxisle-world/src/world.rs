//! The voxel world: generated voxels, chunk metadata and chunk meshes.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, trace};
use voxisle_core::constants::CHUNK_SIZE;
use voxisle_core::coords::index;
use voxisle_core::{BlockId, ChunkPos, LocalPos, Result, WorldPos};

use crate::arena::VoxelArena;
use crate::chunk::Chunk;
use crate::config::{WorldConfig, WorldDims};
use crate::generation::TerrainGenerator;
use crate::meshing::ChunkMesher;

/// A fixed-size world of chunks.
///
/// Voxels live in one [`VoxelArena`]; each [`Chunk`] holds the metadata and
/// mesh derived from its slice of it.
pub struct World {
    config: WorldConfig,
    generator: TerrainGenerator,
    arena: VoxelArena,
    chunks: Vec<Chunk>,
    mesher: ChunkMesher,
}

impl World {
    /// Generate and mesh a world.
    ///
    /// Generation runs first over every chunk in parallel. Meshing runs only
    /// once all voxels exist, since faces on chunk borders depend on the
    /// neighboring chunk.
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let dims = config.dims;
        let generator = TerrainGenerator::new(config.seed, dims, config.terrain.clone())?;

        info!(
            "Generating {}x{}x{} chunk world (seed {})",
            dims.width, dims.height, dims.depth, config.seed
        );
        let start = Instant::now();

        let mut arena = VoxelArena::new(dims);
        let solid: Vec<bool> = arena
            .par_chunks_mut()
            .enumerate()
            .map(|(i, voxels)| generator.generate_chunk(dims.chunk_pos(i), voxels))
            .collect();
        let generated = start.elapsed();

        Ok(Self::assemble(config, generator, arena, &solid, generated))
    }

    /// Build a world whose voxels come from `block_at` instead of the terrain
    /// generator.
    pub fn from_fn<F>(config: WorldConfig, block_at: F) -> Result<Self>
    where
        F: Fn(WorldPos) -> BlockId + Sync,
    {
        config.validate()?;
        let dims = config.dims;
        let generator = TerrainGenerator::new(config.seed, dims, config.terrain.clone())?;
        let start = Instant::now();

        let mut arena = VoxelArena::new(dims);
        let solid: Vec<bool> = arena
            .par_chunks_mut()
            .enumerate()
            .map(|(i, voxels)| {
                let origin = dims.chunk_pos(i).to_world_pos();
                let mut any = false;
                for (voxel_index, slot) in voxels.iter_mut().enumerate() {
                    let local = LocalPos::from_index(voxel_index);
                    *slot = block_at(origin.offset(local.to_ivec3())).0;
                    any |= *slot != 0;
                }
                any
            })
            .collect();
        let generated = start.elapsed();

        Ok(Self::assemble(config, generator, arena, &solid, generated))
    }

    fn assemble(
        config: WorldConfig,
        generator: TerrainGenerator,
        arena: VoxelArena,
        solid: &[bool],
        generated: std::time::Duration,
    ) -> Self {
        let dims = config.dims;
        let start = Instant::now();

        let meshes: Vec<Vec<u32>> = (0..dims.chunk_count())
            .into_par_iter()
            .map_init(ChunkMesher::new, |mesher, i| {
                if solid[i] {
                    mesher.build(&arena, dims.chunk_pos(i))
                } else {
                    Vec::new()
                }
            })
            .collect();

        let chunks: Vec<Chunk> = meshes
            .into_iter()
            .enumerate()
            .map(|(i, vertices)| {
                let mut chunk = Chunk::new(dims.chunk_pos(i), i, !solid[i]);
                chunk.set_mesh(vertices);
                chunk
            })
            .collect();

        let vertices: usize = chunks
            .iter()
            .filter_map(Chunk::mesh)
            .map(|m| m.vertex_count())
            .sum();
        info!(
            "World ready: {} chunks ({} non-empty), {} vertices, generated in {:.2?}, meshed in {:.2?}",
            chunks.len(),
            solid.iter().filter(|&&s| s).count(),
            vertices,
            generated,
            start.elapsed()
        );

        Self {
            config,
            generator,
            arena,
            chunks,
            mesher: ChunkMesher::new(),
        }
    }

    /// Configuration the world was built from.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// World size in chunks.
    pub fn dims(&self) -> WorldDims {
        self.config.dims
    }

    /// Voxel storage.
    pub fn arena(&self) -> &VoxelArena {
        &self.arena
    }

    /// Terrain generator used for this world.
    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// All chunks in chunk index order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Mutable chunks, for marking meshes as uploaded.
    pub fn chunks_mut(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    /// Chunk at a chunk position, or `None` outside the world.
    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(self.dims().chunk_index(pos)?)
    }

    /// Block at a world position, or `None` outside the world.
    pub fn get_block(&self, pos: WorldPos) -> Option<BlockId> {
        self.arena.get(pos)
    }

    /// Overwrite a voxel and keep the owning chunk's empty flag current.
    ///
    /// Meshes are not rebuilt. Returns the previous block, or `None` outside
    /// the world.
    pub fn set_block(&mut self, pos: WorldPos, block: BlockId) -> Option<BlockId> {
        let loc = self.arena.locate(pos)?;
        let previous = self.arena.set(pos, block)?;
        let chunk = &mut self.chunks[loc.chunk_index];
        if block.is_solid() {
            chunk.set_empty(false);
        } else if previous.is_solid() {
            let empty = self.arena.chunk(loc.chunk_index).iter().all(|&v| v == 0);
            chunk.set_empty(empty);
        }
        Some(previous)
    }

    /// Rebuild one chunk's mesh from the current voxels.
    ///
    /// Returns `false` if the chunk is outside the world.
    pub fn rebuild_chunk(&mut self, pos: ChunkPos) -> bool {
        let Some(i) = self.dims().chunk_index(pos) else {
            return false;
        };
        let vertices = if self.chunks[i].is_empty() {
            Vec::new()
        } else {
            self.mesher.build(&self.arena, pos)
        };
        trace!("Rebuilt chunk {:?}: {} vertices", pos, vertices.len());
        self.chunks[i].set_mesh(vertices);
        true
    }

    /// Rebuild every chunk's mesh in parallel.
    pub fn rebuild_all_meshes(&mut self) {
        let arena = &self.arena;
        self.chunks.par_iter_mut().for_each_init(ChunkMesher::new, |mesher, chunk| {
            let vertices = if chunk.is_empty() {
                Vec::new()
            } else {
                mesher.build(arena, chunk.pos)
            };
            chunk.set_mesh(vertices);
        });
    }

    /// Total vertices across all chunk meshes.
    pub fn vertex_count(&self) -> usize {
        self.chunks
            .iter()
            .filter_map(Chunk::mesh)
            .map(|m| m.vertex_count())
            .sum()
    }

    /// Voxel bytes of one chunk, indexed by [`index`].
    pub fn chunk_voxels(&self, pos: ChunkPos) -> Option<&[u8]> {
        let i = self.dims().chunk_index(pos)?;
        Some(self.arena.chunk(i))
    }

    /// Block inside a chunk by local coordinates.
    ///
    /// Returns `None` outside the world or when a coordinate is not below
    /// `CHUNK_SIZE`.
    pub fn local_block(&self, pos: ChunkPos, x: usize, y: usize, z: usize) -> Option<BlockId> {
        if x >= CHUNK_SIZE || y >= CHUNK_SIZE || z >= CHUNK_SIZE {
            return None;
        }
        let voxels = self.chunk_voxels(pos)?;
        Some(BlockId(voxels[index(x, y, z)]))
    }
}
