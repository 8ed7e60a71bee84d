//! Voxel picking, collision probes and single-voxel edits.

use glam::{IVec3, Vec3};
use tracing::debug;
use voxisle_core::constants::CHUNK_SIZE;
use voxisle_core::math::Ray;
use voxisle_core::{BlockId, ChunkPos, WorldPos};

use crate::raycast::{cast_ray, RayHit};
use crate::world::World;

/// Default reach of the picking ray, in voxels.
pub const MAX_RAYCAST_DISTANCE: f32 = 8.0;

/// Reach of a collision probe, in voxels.
pub const COLLISION_PROBE_DISTANCE: f32 = 3.0;

/// Camera pose the manager picks and probes from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    /// Eye position in world units.
    pub position: Vec3,
    /// Unit view direction.
    pub front: Vec3,
    /// Unit right vector.
    pub right: Vec3,
    /// Unit up vector.
    pub up: Vec3,
}

impl ViewState {
    /// Build a view from a position and a view direction, deriving the
    /// right and up vectors against world +Y. Looking straight up or down
    /// takes +X as right.
    pub fn looking(position: Vec3, front: Vec3) -> Self {
        let front = front.normalize_or_zero();
        let right = front.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(front).normalize_or_zero();
        Self {
            position,
            front,
            right,
            up,
        }
    }

    /// Unit vector of a movement direction in this view's basis.
    pub fn direction(&self, direction: MoveDirection) -> Vec3 {
        match direction {
            MoveDirection::Forward => self.front,
            MoveDirection::Backward => -self.front,
            MoveDirection::Left => -self.right,
            MoveDirection::Right => self.right,
            MoveDirection::Up => self.up,
            MoveDirection::Down => -self.up,
        }
    }
}

/// Directions a collision probe can check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// What [`ChunkManager::apply_edit`] does with the picked voxel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EditMode {
    /// Place the brush block against the picked face.
    #[default]
    Add,
    /// Clear the picked voxel.
    Remove,
}

impl EditMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            EditMode::Add => EditMode::Remove,
            EditMode::Remove => EditMode::Add,
        }
    }
}

/// Result of an edit that changed the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    /// Kind of edit performed.
    pub mode: EditMode,
    /// Edited voxel.
    pub position: WorldPos,
    /// Block written (air for removals).
    pub block: BlockId,
    /// Chunks whose meshes were rebuilt, edited chunk first.
    pub rebuilt: Vec<ChunkPos>,
}

/// Owns the world and turns picking rays into voxel edits.
pub struct ChunkManager {
    world: World,
    hit: Option<RayHit>,
    mode: EditMode,
    brush: BlockId,
    max_distance: f32,
}

impl ChunkManager {
    /// Wrap a world with default picking settings.
    pub fn new(world: World) -> Self {
        Self {
            world,
            hit: None,
            mode: EditMode::default(),
            brush: BlockId::SAND,
            max_distance: MAX_RAYCAST_DISTANCE,
        }
    }

    /// Set the block placed by additions.
    #[must_use]
    pub fn with_brush(mut self, brush: BlockId) -> Self {
        self.brush = brush;
        self
    }

    /// Set the picking reach in voxels.
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// The managed world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the managed world.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Give back the world.
    pub fn into_world(self) -> World {
        self.world
    }

    /// The voxel picked by the last ray cast.
    pub fn hit(&self) -> Option<&RayHit> {
        self.hit.as_ref()
    }

    /// Current edit mode.
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Block placed by additions.
    pub fn brush(&self) -> BlockId {
        self.brush
    }

    /// Change the block placed by additions.
    pub fn set_brush(&mut self, brush: BlockId) {
        self.brush = brush;
    }

    /// Pick the first solid voxel within reach along `forward`.
    ///
    /// Stores the hit for later edits, or clears it on a miss. Returns whether
    /// anything was hit.
    pub fn ray_cast(&mut self, origin: Vec3, forward: Vec3) -> bool {
        let end = Ray::new(origin, forward).segment_end(self.max_distance);
        self.hit = cast_ray(self.world.arena(), origin, end);
        self.hit.is_some()
    }

    /// Per-frame update: re-pick from the current view.
    pub fn update(&mut self, view: &ViewState) -> bool {
        self.ray_cast(view.position, view.front)
    }

    /// Whether a solid voxel lies within a short reach of the view position in
    /// the given direction. Does not touch the stored hit.
    pub fn check_collision(&self, view: &ViewState, direction: MoveDirection) -> bool {
        let end = Ray::new(view.position, view.direction(direction))
            .segment_end(COLLISION_PROBE_DISTANCE);
        cast_ray(self.world.arena(), view.position, end).is_some()
    }

    /// Switch between adding and removing.
    pub fn toggle_mode(&mut self) -> EditMode {
        self.mode = self.mode.toggled();
        debug!("Edit mode: {:?}", self.mode);
        self.mode
    }

    /// Add or remove at the picked voxel, depending on the current mode.
    pub fn apply_edit(&mut self) -> Option<EditOutcome> {
        match self.mode {
            EditMode::Add => self.add_voxel(),
            EditMode::Remove => self.remove_voxel(),
        }
    }

    /// Place the brush block in the empty cell in front of the picked face.
    ///
    /// Does nothing without a hit, or if the target cell is occupied or
    /// outside the world.
    pub fn add_voxel(&mut self) -> Option<EditOutcome> {
        let hit = self.hit?;
        let target = hit.adjacent();
        if self.world.get_block(target)?.is_solid() {
            return None;
        }
        self.world.set_block(target, self.brush)?;
        self.hit = None;

        let rebuilt = self.rebuild_around(target);
        debug!(
            "Added {} at {:?}, rebuilt {} chunks",
            self.brush.name(),
            target,
            rebuilt.len()
        );
        Some(EditOutcome {
            mode: EditMode::Add,
            position: target,
            block: self.brush,
            rebuilt,
        })
    }

    /// Clear the picked voxel.
    ///
    /// Does nothing without a hit.
    pub fn remove_voxel(&mut self) -> Option<EditOutcome> {
        let hit = self.hit?;
        let previous = self.world.set_block(hit.world, BlockId::AIR)?;
        self.hit = None;

        let rebuilt = self.rebuild_around(hit.world);
        debug!(
            "Removed {} at {:?}, rebuilt {} chunks",
            previous.name(),
            hit.world,
            rebuilt.len()
        );
        Some(EditOutcome {
            mode: EditMode::Remove,
            position: hit.world,
            block: BlockId::AIR,
            rebuilt,
        })
    }

    /// Rebuild the chunk holding `pos` and each neighbor chunk that shares a
    /// face with it.
    fn rebuild_around(&mut self, pos: WorldPos) -> Vec<ChunkPos> {
        let (chunk, local) = pos.split();
        let mut rebuilt = Vec::with_capacity(4);
        if self.world.rebuild_chunk(chunk) {
            rebuilt.push(chunk);
        }
        if !local.on_boundary() {
            return rebuilt;
        }

        let last = (CHUNK_SIZE - 1) as u8;
        let coords = [local.x, local.y, local.z];
        for (axis, unit) in [IVec3::X, IVec3::Y, IVec3::Z].into_iter().enumerate() {
            let neighbor = if coords[axis] == 0 {
                chunk.offset(-unit)
            } else if coords[axis] == last {
                chunk.offset(unit)
            } else {
                continue;
            };
            if self.world.rebuild_chunk(neighbor) {
                rebuilt.push(neighbor);
            }
        }
        rebuilt
    }
}
