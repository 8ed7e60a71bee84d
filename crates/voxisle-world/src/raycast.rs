//! Voxel ray traversal (Amanatides-Woo DDA) and ray picking.

use glam::{IVec3, Vec3};
use voxisle_core::math::AxisStep;
use voxisle_core::{BlockId, ChunkPos, LocalPos, WorldPos};

use crate::arena::VoxelArena;

/// First solid voxel along a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    /// Block that was hit.
    pub block: BlockId,
    /// Hit voxel in world coordinates.
    pub world: WorldPos,
    /// Chunk owning the hit voxel.
    pub chunk: ChunkPos,
    /// Position of the hit voxel inside its chunk.
    pub local: LocalPos,
    /// Flat index of the hit voxel inside its chunk.
    pub voxel_index: usize,
    /// Unit normal of the face the ray entered through, or zero if the ray
    /// started inside the hit voxel.
    pub normal: IVec3,
}

impl RayHit {
    /// The empty cell in front of the hit face, where a new voxel would go.
    pub fn adjacent(&self) -> WorldPos {
        self.world.offset(self.normal)
    }
}

/// Iterator over the voxels a segment passes through, in order.
///
/// Each item is the voxel and the normal of the face it was entered through.
/// The first voxel, which contains the start point, has a zero normal.
#[derive(Clone, Debug)]
pub struct VoxelTraversal {
    voxel: IVec3,
    normal: IVec3,
    axes: [AxisStep; 3],
    finished: bool,
}

impl VoxelTraversal {
    /// Traverse from `start` to `end`.
    ///
    /// A segment with a non-finite end point yields no voxels.
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            voxel: start.floor().as_ivec3(),
            normal: IVec3::ZERO,
            axes: [
                AxisStep::new(start.x, end.x),
                AxisStep::new(start.y, end.y),
                AxisStep::new(start.z, end.z),
            ],
            finished: !start.is_finite() || !end.is_finite(),
        }
    }

    fn covered(&self) -> bool {
        self.axes.iter().all(|a| a.t_max > 1.0)
    }

    fn next_axis(&self) -> usize {
        let [x, y, z] = self.axes.map(|a| a.t_max);
        if x < y {
            if x < z {
                0
            } else {
                2
            }
        } else if y < z {
            1
        } else {
            2
        }
    }

    /// Move into the next voxel. Axes the segment runs parallel to only push
    /// their crossing out of reach.
    fn step(&mut self) {
        while !self.covered() {
            let axis = self.next_axis();
            let state = &mut self.axes[axis];
            let step = state.step;
            state.advance();
            if step != 0 {
                self.voxel[axis] += step;
                self.normal = IVec3::ZERO;
                self.normal[axis] = -step;
                return;
            }
        }
    }
}

impl Iterator for VoxelTraversal {
    type Item = (WorldPos, IVec3);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.covered() {
            self.finished = true;
            return None;
        }
        let current = (WorldPos::from(self.voxel), self.normal);
        self.step();
        Some(current)
    }
}

/// Find the first solid voxel on the segment from `start` to `end`.
///
/// Voxels outside the world count as empty; the traversal continues through
/// them.
#[cfg_attr(feature = "profiling", tracing::instrument(level = "trace", skip_all))]
pub fn cast_ray(arena: &VoxelArena, start: Vec3, end: Vec3) -> Option<RayHit> {
    VoxelTraversal::new(start, end).find_map(|(world, normal)| {
        let loc = arena.locate(world)?;
        let block = BlockId(arena.chunk(loc.chunk_index)[loc.voxel_index]);
        block.is_solid().then_some(RayHit {
            block,
            world,
            chunk: loc.chunk,
            local: loc.local,
            voxel_index: loc.voxel_index,
            normal,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldDims;

    fn floor_arena(level: i32) -> VoxelArena {
        let mut arena = VoxelArena::new(WorldDims::new(2, 1, 2));
        for x in 0..96 {
            for z in 0..96 {
                for y in 0..level {
                    arena.set(WorldPos::new(x, y, z), BlockId::DIRT);
                }
            }
        }
        arena
    }

    #[test]
    fn traversal_visits_face_adjacent_voxels() {
        let start = Vec3::new(0.3, 0.6, 0.1);
        let end = Vec3::new(5.7, -3.2, 2.9);
        let cells: Vec<_> = VoxelTraversal::new(start, end).collect();

        assert_eq!(cells[0], (WorldPos::new(0, 0, 0), IVec3::ZERO));
        // Eleven boundary crossings; the voxel holding the end point is not visited.
        assert_eq!(cells.len(), 11);
        for pair in cells.windows(2) {
            let delta = pair[1].0.to_ivec3() - pair[0].0.to_ivec3();
            assert_eq!(delta.abs().element_sum(), 1, "{pair:?}");
            assert_eq!(pair[1].1, -delta);
        }
    }

    #[test]
    fn traversal_along_an_axis() {
        let cells: Vec<_> =
            VoxelTraversal::new(Vec3::new(2.5, 7.5, 2.5), Vec3::new(2.5, 3.5, 2.5))
                .map(|(p, _)| p.y)
                .collect();
        assert_eq!(cells, vec![7, 6, 5, 4]);
    }

    #[test]
    fn traversal_from_integer_start() {
        let cells: Vec<_> =
            VoxelTraversal::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(4.5, 1.0, 1.0)).collect();
        let xs: Vec<i32> = cells.iter().map(|(p, _)| p.x).collect();
        assert_eq!(xs, vec![1, 2, 3]);
        assert!(cells.iter().all(|(p, _)| p.y == 1 && p.z == 1));
    }

    #[test]
    fn ray_down_hits_floor_top() {
        let arena = floor_arena(4);
        let hit = cast_ray(
            &arena,
            Vec3::new(10.5, 12.5, 10.5),
            Vec3::new(10.5, 4.5 - 8.0, 10.5),
        )
        .unwrap();
        assert_eq!(hit.world, WorldPos::new(10, 3, 10));
        assert_eq!(hit.normal, IVec3::Y);
        assert_eq!(hit.block, BlockId::DIRT);
        assert_eq!(hit.adjacent(), WorldPos::new(10, 4, 10));
    }

    #[test]
    fn hit_reports_chunk_and_local() {
        let arena = floor_arena(4);
        let hit = cast_ray(
            &arena,
            Vec3::new(50.5, 8.5, 60.5),
            Vec3::new(50.5, 0.5, 60.5),
        )
        .unwrap();
        assert_eq!(hit.chunk, ChunkPos::new(1, 0, 1));
        assert_eq!(hit.local, LocalPos::new(2, 3, 12));
        assert_eq!(hit.voxel_index, hit.local.to_index());
    }

    #[test]
    fn ray_starting_inside_solid_has_zero_normal() {
        let arena = floor_arena(4);
        let hit = cast_ray(&arena, Vec3::new(3.5, 1.5, 3.5), Vec3::new(3.5, 9.5, 3.5)).unwrap();
        assert_eq!(hit.world, WorldPos::new(3, 1, 3));
        assert_eq!(hit.normal, IVec3::ZERO);
    }

    #[test]
    fn ray_through_air_misses() {
        let arena = floor_arena(4);
        assert!(cast_ray(&arena, Vec3::new(3.5, 10.5, 3.5), Vec3::new(9.5, 10.5, 3.5)).is_none());
    }

    #[test]
    fn ray_passes_through_outside_world() {
        let arena = floor_arena(4);
        let hit = cast_ray(
            &arena,
            Vec3::new(-2.5, 2.5, 5.5),
            Vec3::new(4.5, 2.5, 5.5),
        )
        .unwrap();
        assert_eq!(hit.world, WorldPos::new(0, 2, 5));
        assert_eq!(hit.normal, IVec3::NEG_X);
    }

    #[test]
    fn ray_short_of_target_misses() {
        let arena = floor_arena(4);
        assert!(cast_ray(&arena, Vec3::new(5.5, 20.5, 5.5), Vec3::new(5.5, 12.5, 5.5)).is_none());
    }

    #[test]
    fn non_finite_segment_yields_nothing() {
        let nan = Vec3::new(f32::NAN, 5.5, 5.5);
        let down = Vec3::new(5.5, 0.5, 5.5);
        assert_eq!(VoxelTraversal::new(nan, down).count(), 0);

        let arena = floor_arena(4);
        assert!(cast_ray(&arena, nan, down).is_none());
        let up = Vec3::new(3.5, f32::INFINITY, 3.5);
        assert!(cast_ray(&arena, Vec3::new(3.5, 6.5, 3.5), up).is_none());
        assert!(cast_ray(&arena, -up, down).is_none());
    }
}
