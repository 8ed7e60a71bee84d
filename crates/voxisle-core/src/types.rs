//! Core voxel types.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Material id stored in every voxel.
///
/// Block ID 0 is reserved for air (empty space).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct BlockId(pub u8);

impl BlockId {
    /// Air block (empty space)
    pub const AIR: Self = Self(0);
    /// Sand block
    pub const SAND: Self = Self(1);
    /// Grass block
    pub const GRASS: Self = Self(2);
    /// Dirt block
    pub const DIRT: Self = Self(3);
    /// Stone block
    pub const STONE: Self = Self(4);
    /// Snow block
    pub const SNOW: Self = Self(5);
    /// Tree leaves block
    pub const LEAVES: Self = Self(6);
    /// Tree trunk block
    pub const WOOD: Self = Self(7);

    /// Returns true if this block is air (empty)
    #[inline]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this block is solid (not air)
    #[inline]
    pub const fn is_solid(self) -> bool {
        self.0 != 0
    }

    /// Human readable name, used in logs.
    pub const fn name(self) -> &'static str {
        match self.0 {
            0 => "air",
            1 => "sand",
            2 => "grass",
            3 => "dirt",
            4 => "stone",
            5 => "snow",
            6 => "leaves",
            7 => "wood",
            _ => "unknown",
        }
    }
}

impl From<u8> for BlockId {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<BlockId> for u8 {
    fn from(id: BlockId) -> Self {
        id.0
    }
}
