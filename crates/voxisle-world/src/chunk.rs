//! Chunk metadata and meshes.

use glam::Vec3;
use voxisle_core::constants::{CHUNK_HALF_SIZE, CHUNK_SIZE};
use voxisle_core::coords::ChunkPos;

/// Packed vertex buffer of one chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkMesh {
    vertices: Vec<u32>,
    revision: u64,
}

impl ChunkMesh {
    /// Packed vertices, six per visible face.
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Vertex data as bytes, ready for a GPU buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of visible faces.
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 6
    }

    /// Number of times this mesh has been built.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// A single chunk of the world (48x48x48 voxels).
///
/// The voxels themselves live in the world's arena; the chunk keeps what is
/// derived from them.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// Position in chunk coordinates.
    pub pos: ChunkPos,
    /// Flat index into the world's chunk grid and voxel arena.
    index: usize,
    /// Whether every voxel is air.
    empty: bool,
    /// Built on world construction and after every edit touching the chunk.
    mesh: Option<ChunkMesh>,
    /// Whether the mesh changed since the renderer last uploaded it.
    pub dirty: bool,
}

impl Chunk {
    /// Create a chunk with no mesh yet.
    pub fn new(pos: ChunkPos, index: usize, empty: bool) -> Self {
        Self {
            pos,
            index,
            empty,
            mesh: None,
            dirty: true,
        }
    }

    /// Flat index into the world's chunk grid.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if this chunk is empty (all air).
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub(crate) fn set_empty(&mut self, empty: bool) {
        self.empty = empty;
    }

    /// The chunk's mesh, `None` until first built.
    pub fn mesh(&self) -> Option<&ChunkMesh> {
        self.mesh.as_ref()
    }

    /// Replace the mesh with freshly built vertices.
    pub(crate) fn set_mesh(&mut self, vertices: Vec<u32>) {
        let revision = self.mesh.as_ref().map_or(0, |m| m.revision) + 1;
        self.mesh = Some(ChunkMesh { vertices, revision });
        self.dirty = true;
    }

    /// Mark chunk as uploaded to GPU.
    pub fn mark_uploaded(&mut self) {
        self.dirty = false;
    }

    /// Model translation: the chunk's corner in world units.
    pub fn model_translation(&self) -> Vec3 {
        self.pos.to_ivec3().as_vec3() * CHUNK_SIZE as f32
    }

    /// Center of the chunk in world units, for frustum tests.
    pub fn center(&self) -> Vec3 {
        self.model_translation() + Vec3::splat(CHUNK_HALF_SIZE as f32)
    }
}
