//! Face-culled, ambient-occluded chunk meshing.
//!
//! Every visible voxel face becomes two triangles. Each vertex is packed into
//! a single `u32`, most significant bits first:
//!
//! | bits | field |
//! |------|-------|
//! | 6 | local x (0..=48) |
//! | 6 | local y |
//! | 6 | local z |
//! | 8 | material id |
//! | 3 | face id |
//! | 2 | ambient occlusion (occluders around the corner, 0..=3) |
//! | 1 | flip (quad split along the other diagonal) |

use glam::IVec3;
use voxisle_core::constants::{CHUNK_SIZE, CHUNK_VOLUME};
use voxisle_core::coords::index;
use voxisle_core::{ChunkPos, WorldPos};

use crate::arena::VoxelArena;

/// Upper bound on vertices a chunk can produce: a checkerboard fills half the
/// volume with voxels showing all six faces of six vertices each.
pub const MAX_CHUNK_VERTICES: usize = CHUNK_VOLUME * 18;

/// The six face directions, in packed face id order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    /// +Y
    Top = 0,
    /// -Y
    Bottom = 1,
    /// +X
    Right = 2,
    /// -X
    Left = 3,
    /// -Z
    Back = 4,
    /// +Z
    Front = 5,
}

impl Face {
    /// All faces in id order.
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Right,
        Face::Left,
        Face::Back,
        Face::Front,
    ];

    /// Outward normal.
    pub const fn normal(self) -> IVec3 {
        match self {
            Face::Top => IVec3::Y,
            Face::Bottom => IVec3::NEG_Y,
            Face::Right => IVec3::X,
            Face::Left => IVec3::NEG_X,
            Face::Back => IVec3::NEG_Z,
            Face::Front => IVec3::Z,
        }
    }

    /// Face for a packed face id.
    pub const fn from_id(id: u8) -> Option<Face> {
        match id {
            0 => Some(Face::Top),
            1 => Some(Face::Bottom),
            2 => Some(Face::Right),
            3 => Some(Face::Left),
            4 => Some(Face::Back),
            5 => Some(Face::Front),
            _ => None,
        }
    }
}

/// Decoded form of a packed vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshVertex {
    pub x: u8,
    pub y: u8,
    pub z: u8,
    pub material: u8,
    pub face: u8,
    pub ao: u8,
    pub flip: bool,
}

impl MeshVertex {
    /// Pack into the 32-bit vertex format.
    #[inline]
    pub const fn pack(self) -> u32 {
        (self.x as u32) << 26
            | (self.y as u32) << 20
            | (self.z as u32) << 14
            | (self.material as u32) << 6
            | (self.face as u32) << 3
            | (self.ao as u32) << 1
            | self.flip as u32
    }

    /// Unpack from the 32-bit vertex format.
    #[inline]
    pub const fn unpack(packed: u32) -> Self {
        Self {
            x: ((packed >> 26) & 0x3f) as u8,
            y: ((packed >> 20) & 0x3f) as u8,
            z: ((packed >> 14) & 0x3f) as u8,
            material: ((packed >> 6) & 0xff) as u8,
            face: ((packed >> 3) & 0x7) as u8,
            ao: ((packed >> 1) & 0x3) as u8,
            flip: packed & 1 == 1,
        }
    }
}

/// Pack vertex fields into the 32-bit vertex format.
#[inline]
pub const fn pack_vertex(vertex: MeshVertex) -> u32 {
    vertex.pack()
}

/// Decode a packed vertex.
#[inline]
pub const fn unpack_vertex(packed: u32) -> MeshVertex {
    MeshVertex::unpack(packed)
}

/// Axes spanning a face plane, as (u, v) unit vectors.
#[derive(Clone, Copy)]
enum Plane {
    X,
    Y,
    Z,
}

impl Plane {
    const fn axes(self) -> (IVec3, IVec3) {
        match self {
            Plane::X => (IVec3::Y, IVec3::Z),
            Plane::Y => (IVec3::X, IVec3::Z),
            Plane::Z => (IVec3::Y, IVec3::X),
        }
    }
}

/// The eight cells around a face's neighbor cell, as (u, v) offsets:
/// `a b c d e f g h`, walking around the ring.
const RING: [(i32, i32); 8] = [
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
];

struct FaceLayout {
    face: Face,
    plane: Plane,
    /// Quad corners relative to the voxel's minimum corner, v0..v3.
    corners: [IVec3; 4],
    /// Corner order of the two triangles.
    winding: [usize; 6],
    /// Corner order when the quad is split along the other diagonal.
    flipped: [usize; 6],
}

const FACES: [FaceLayout; 6] = [
    FaceLayout {
        face: Face::Top,
        plane: Plane::Y,
        corners: [
            IVec3::new(0, 1, 0),
            IVec3::new(1, 1, 0),
            IVec3::new(1, 1, 1),
            IVec3::new(0, 1, 1),
        ],
        winding: [0, 3, 2, 0, 2, 1],
        flipped: [1, 0, 3, 1, 3, 2],
    },
    FaceLayout {
        face: Face::Bottom,
        plane: Plane::Y,
        corners: [
            IVec3::new(0, 0, 0),
            IVec3::new(1, 0, 0),
            IVec3::new(1, 0, 1),
            IVec3::new(0, 0, 1),
        ],
        winding: [0, 2, 3, 0, 1, 2],
        flipped: [1, 3, 0, 1, 2, 3],
    },
    FaceLayout {
        face: Face::Right,
        plane: Plane::X,
        corners: [
            IVec3::new(1, 0, 0),
            IVec3::new(1, 1, 0),
            IVec3::new(1, 1, 1),
            IVec3::new(1, 0, 1),
        ],
        winding: [0, 1, 2, 0, 2, 3],
        flipped: [3, 0, 1, 3, 1, 2],
    },
    FaceLayout {
        face: Face::Left,
        plane: Plane::X,
        corners: [
            IVec3::new(0, 0, 0),
            IVec3::new(0, 1, 0),
            IVec3::new(0, 1, 1),
            IVec3::new(0, 0, 1),
        ],
        winding: [0, 2, 1, 0, 3, 2],
        flipped: [3, 1, 0, 3, 2, 1],
    },
    FaceLayout {
        face: Face::Back,
        plane: Plane::Z,
        corners: [
            IVec3::new(0, 0, 0),
            IVec3::new(0, 1, 0),
            IVec3::new(1, 1, 0),
            IVec3::new(1, 0, 0),
        ],
        winding: [0, 1, 2, 0, 2, 3],
        flipped: [3, 0, 1, 3, 1, 2],
    },
    FaceLayout {
        face: Face::Front,
        plane: Plane::Z,
        corners: [
            IVec3::new(0, 0, 1),
            IVec3::new(0, 1, 1),
            IVec3::new(1, 1, 1),
            IVec3::new(1, 0, 1),
        ],
        winding: [0, 2, 1, 0, 3, 2],
        flipped: [3, 1, 0, 3, 2, 1],
    },
];

/// Solid-voxel lookup for one chunk that falls back to world coordinates
/// for cells outside it.
struct Neighborhood<'a> {
    arena: &'a VoxelArena,
    voxels: &'a [u8],
    origin: WorldPos,
}

impl Neighborhood<'_> {
    /// Whether the cell at a chunk-local position (possibly one past either
    /// edge) is solid. Cells outside the world are not.
    #[inline]
    fn solid(&self, local: IVec3) -> bool {
        let size = CHUNK_SIZE as i32;
        if local.cmpge(IVec3::ZERO).all() && local.cmplt(IVec3::splat(size)).all() {
            self.voxels[index(local.x as usize, local.y as usize, local.z as usize)] != 0
        } else {
            self.arena.is_solid(self.origin.offset(local))
        }
    }

    /// Occluder count per quad corner for a face whose open side is `cell`.
    #[inline]
    fn ambient_occlusion(&self, cell: IVec3, plane: Plane) -> [u8; 4] {
        let (u, v) = plane.axes();
        let [a, b, c, d, e, f, g, h] =
            RING.map(|(du, dv)| u8::from(self.solid(cell + u * du + v * dv)));
        [a + b + c, g + h + a, e + f + g, c + d + e]
    }
}

/// Builds chunk meshes, reusing one scratch buffer across calls.
pub struct ChunkMesher {
    scratch: Vec<u32>,
}

impl Default for ChunkMesher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkMesher {
    /// Create a mesher with a scratch buffer large enough for any chunk.
    pub fn new() -> Self {
        Self {
            scratch: Vec::with_capacity(MAX_CHUNK_VERTICES),
        }
    }

    /// Build the packed vertex buffer of the chunk at `pos`.
    ///
    /// Neighbor lookups that leave the chunk go through the arena in world
    /// coordinates, so faces between solid voxels of adjacent chunks are
    /// culled. Faces on the world boundary are kept.
    ///
    /// Returns an empty buffer if the chunk is outside the world.
    #[cfg_attr(
        feature = "profiling",
        tracing::instrument(level = "trace", skip_all, fields(chunk = ?pos))
    )]
    pub fn build(&mut self, arena: &VoxelArena, pos: ChunkPos) -> Vec<u32> {
        let Some(chunk_index) = arena.dims().chunk_index(pos) else {
            return Vec::new();
        };
        let area = Neighborhood {
            arena,
            voxels: arena.chunk(chunk_index),
            origin: pos.to_world_pos(),
        };

        self.scratch.clear();
        for y in 0..CHUNK_SIZE {
            for z in 0..CHUNK_SIZE {
                for x in 0..CHUNK_SIZE {
                    let material = area.voxels[index(x, y, z)];
                    if material == 0 {
                        continue;
                    }
                    let voxel = IVec3::new(x as i32, y as i32, z as i32);
                    for layout in &FACES {
                        let cell = voxel + layout.face.normal();
                        if area.solid(cell) {
                            continue;
                        }
                        let ao = area.ambient_occlusion(cell, layout.plane);
                        self.push_face(voxel, material, layout, ao);
                    }
                }
            }
        }

        self.scratch.as_slice().to_vec()
    }

    #[inline]
    fn push_face(&mut self, voxel: IVec3, material: u8, layout: &FaceLayout, ao: [u8; 4]) {
        // Split the quad across the less occluded diagonal so AO interpolates
        // without a visible crease.
        let flip = ao[1] + ao[3] < ao[0] + ao[2];
        let order = if flip {
            &layout.flipped
        } else {
            &layout.winding
        };
        for &corner in order {
            let p = voxel + layout.corners[corner];
            self.scratch.push(
                MeshVertex {
                    x: p.x as u8,
                    y: p.y as u8,
                    z: p.z as u8,
                    material,
                    face: layout.face as u8,
                    ao: ao[corner],
                    flip,
                }
                .pack(),
            );
        }
    }
}

/// Build one chunk's mesh with a temporary mesher.
pub fn build_chunk_mesh(arena: &VoxelArena, pos: ChunkPos) -> Vec<u32> {
    ChunkMesher::new().build(arena, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldDims;
    use voxisle_core::BlockId;

    fn faces(vertices: &[u32]) -> Vec<[MeshVertex; 6]> {
        vertices
            .chunks_exact(6)
            .map(|quad| std::array::from_fn(|i| MeshVertex::unpack(quad[i])))
            .collect()
    }

    #[test]
    fn packing_bit_layout() {
        let vertex = MeshVertex {
            x: 1,
            y: 2,
            z: 3,
            material: 4,
            face: 5,
            ao: 2,
            flip: true,
        };
        let expected = 1 << 26 | 2 << 20 | 3 << 14 | 4 << 6 | 5 << 3 | 2 << 1 | 1;
        assert_eq!(pack_vertex(vertex), expected);
        assert_eq!(unpack_vertex(expected), vertex);

        let max = MeshVertex {
            x: 63,
            y: 63,
            z: 63,
            material: 255,
            face: 7,
            ao: 3,
            flip: true,
        };
        assert_eq!(max.pack(), u32::MAX);
    }

    #[test]
    fn empty_chunk_has_no_vertices() {
        let arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        assert!(build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0)).is_empty());
    }

    #[test]
    fn chunk_outside_world_has_no_vertices() {
        let arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        assert!(build_chunk_mesh(&arena, ChunkPos::new(1, 0, 0)).is_empty());
    }

    #[test]
    fn isolated_voxel_has_six_faces() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        arena.set(WorldPos::new(10, 10, 10), BlockId::STONE);

        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        assert_eq!(vertices.len(), 36);

        let quads = faces(&vertices);
        for (face, quad) in Face::ALL.iter().zip(&quads) {
            for v in quad {
                assert_eq!(Face::from_id(v.face), Some(*face));
                assert_eq!(v.material, BlockId::STONE.0);
                assert_eq!(v.ao, 0);
                assert!(!v.flip);
                assert!((10..=11).contains(&v.x));
                assert!((10..=11).contains(&v.y));
                assert!((10..=11).contains(&v.z));
            }
        }
    }

    #[test]
    fn enclosed_voxel_has_no_faces() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        let center = IVec3::new(10, 10, 10);
        arena.set(center.into(), BlockId::STONE);
        for face in Face::ALL {
            arena.set((center + face.normal()).into(), BlockId::DIRT);
        }

        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        // Each of the six arms shows every face except the one against the center.
        assert_eq!(vertices.len(), 6 * 5 * 6);
        assert!(faces(&vertices)
            .iter()
            .all(|quad| quad[0].material == BlockId::DIRT.0));
    }

    #[test]
    fn faces_between_chunks_are_culled() {
        let mut arena = VoxelArena::new(WorldDims::new(2, 1, 1));
        let last = CHUNK_SIZE as i32 - 1;
        arena.set(WorldPos::new(last, 10, 10), BlockId::STONE);
        arena.set(WorldPos::new(last + 1, 10, 10), BlockId::STONE);

        let left = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        let right = build_chunk_mesh(&arena, ChunkPos::new(1, 0, 0));
        assert_eq!(left.len(), 30);
        assert_eq!(right.len(), 30);
        assert!(faces(&left).iter().all(|q| q[0].face != Face::Right as u8));
        assert!(faces(&right).iter().all(|q| q[0].face != Face::Left as u8));
    }

    #[test]
    fn world_edge_faces_are_kept() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        arena.set(WorldPos::new(0, 0, 0), BlockId::SAND);
        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        assert_eq!(vertices.len(), 36);
    }

    #[test]
    fn far_corner_vertices_reach_chunk_size() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        let last = CHUNK_SIZE as i32 - 1;
        arena.set(WorldPos::new(last, last, last), BlockId::SNOW);
        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        let max_x = vertices
            .iter()
            .map(|&v| MeshVertex::unpack(v).x)
            .max()
            .unwrap();
        assert_eq!(usize::from(max_x), CHUNK_SIZE);
    }

    #[test]
    fn diagonal_occluder_flips_quad() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        arena.set(WorldPos::new(4, 5, 4), BlockId::GRASS);
        // Sits diagonally above the +x/+z corner of the grass voxel's top face.
        arena.set(WorldPos::new(5, 6, 5), BlockId::STONE);

        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        let top = faces(&vertices)
            .into_iter()
            .find(|q| q[0].face == Face::Top as u8 && q[0].material == BlockId::GRASS.0)
            .unwrap();

        for v in &top {
            assert!(v.flip);
            let expected = if (v.x, v.z) == (5, 5) { 1 } else { 0 };
            assert_eq!(v.ao, expected, "corner ({}, {})", v.x, v.z);
        }
        // Flipped winding starts at v1.
        assert_eq!((top[0].x, top[0].y, top[0].z), (5, 6, 4));
    }

    #[test]
    fn edge_occluder_keeps_quad() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        arena.set(WorldPos::new(4, 5, 4), BlockId::GRASS);
        // Sits above the +x edge: both +x corners see one occluder.
        arena.set(WorldPos::new(5, 6, 4), BlockId::STONE);

        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        let top = faces(&vertices)
            .into_iter()
            .find(|q| q[0].face == Face::Top as u8 && q[0].material == BlockId::GRASS.0)
            .unwrap();

        for v in &top {
            assert!(!v.flip);
            assert_eq!(v.ao, u8::from(v.x == 5));
        }
        assert_eq!((top[0].x, top[0].y, top[0].z), (4, 6, 4));
    }

    #[test]
    fn occlusion_reads_neighbor_chunks() {
        let mut arena = VoxelArena::new(WorldDims::new(2, 1, 1));
        let last = CHUNK_SIZE as i32 - 1;
        arena.set(WorldPos::new(last, 5, 4), BlockId::GRASS);
        arena.set(WorldPos::new(last + 1, 6, 4), BlockId::STONE);

        let vertices = build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0));
        let top = faces(&vertices)
            .into_iter()
            .find(|q| q[0].face == Face::Top as u8)
            .unwrap();
        for v in &top {
            assert_eq!(v.ao, u8::from(usize::from(v.x) == CHUNK_SIZE));
        }
    }

    #[test]
    fn mesher_reuse_matches_fresh_build() {
        let mut arena = VoxelArena::new(WorldDims::new(1, 1, 1));
        for i in 0..10 {
            arena.set(WorldPos::new(i, i / 2, 3), BlockId::DIRT);
        }
        let mut mesher = ChunkMesher::new();
        let first = mesher.build(&arena, ChunkPos::new(0, 0, 0));
        let second = mesher.build(&arena, ChunkPos::new(0, 0, 0));
        assert_eq!(first, second);
        assert_eq!(first, build_chunk_mesh(&arena, ChunkPos::new(0, 0, 0)));
    }
}
