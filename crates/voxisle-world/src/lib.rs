//! Island world generation, chunk meshing and voxel editing for Voxisle.

pub mod arena;
pub mod chunk;
pub mod chunk_manager;
pub mod clouds;
pub mod config;
pub mod generation;
pub mod meshing;
pub mod noise_field;
pub mod raycast;
pub mod world;

pub use arena::VoxelArena;
pub use chunk::{Chunk, ChunkMesh};
pub use chunk_manager::{ChunkManager, EditMode, EditOutcome, MoveDirection, ViewState};
pub use clouds::CloudLayer;
pub use config::{WorldConfig, WorldDims};
pub use generation::{TerrainConfig, TerrainGenerator};
pub use meshing::{build_chunk_mesh, pack_vertex, unpack_vertex, ChunkMesher, Face, MeshVertex};
pub use noise_field::NoiseField;
pub use raycast::{cast_ray, RayHit, VoxelTraversal};
pub use world::World;

/// World seed for procedural generation.
pub type WorldSeed = u64;
