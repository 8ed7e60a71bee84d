//! Core types, math, and errors for the Voxisle engine.
//!
//! This crate provides the foundational types used throughout the engine:
//! - Material ids
//! - Coordinate systems (world, chunk, local)
//! - Ray segments for grid traversal
//! - Common error types

pub mod coords;
pub mod error;
pub mod math;
pub mod types;

pub use coords::{ChunkPos, LocalPos, WorldPos};
pub use error::{Error, Result};
pub use types::BlockId;

/// Engine-wide constants
pub mod constants {
    /// Size of a chunk in voxels per axis
    pub const CHUNK_SIZE: usize = 48;
    /// Half of the chunk size
    pub const CHUNK_HALF_SIZE: usize = CHUNK_SIZE / 2;
    /// Voxels in one horizontal slice of a chunk (48^2)
    pub const CHUNK_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;
    /// Total voxels in a chunk (48^3)
    pub const CHUNK_VOLUME: usize = CHUNK_AREA * CHUNK_SIZE;
    /// Radius of the sphere enclosing a chunk, for frustum tests
    pub const CHUNK_SPHERE_RADIUS: f32 = 1.732_050_8 * CHUNK_HALF_SIZE as f32;

    // Vertex coordinates run 0..=CHUNK_SIZE and are packed in 6 bits.
    const _: () = assert!(CHUNK_SIZE < 64);
}
